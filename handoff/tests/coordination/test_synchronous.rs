use super::fixtures::{counted_work, tally, LostUpdateCounter};
use handoff::synchronous::*;
use handoff::{Outcome, TryRecvError, WorkerError};
use pretty_assertions::assert_eq;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

const HANG: Duration = Duration::from_millis(300);

#[test_log::test]
fn counter_wait_returns_after_every_worker() {
    for n in [0, 1, 10, 50] {
        let ran = tally();
        assert_eq!(wait_for_all_via_counter(n, |_| counted_work(&ran, 5)), Ok(n));
        assert_eq!(ran.load(Ordering::SeqCst), n);
    }
}

#[test_log::test]
fn counter_wait_is_bounded_by_the_slowest_worker() {
    let start = Instant::now();
    let ran = tally();
    assert_eq!(CounterWait.wait_for(20, |_| counted_work(&ran, 100)), Ok(20));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test_log::test]
fn unbuffered_counted_receive_takes_one_marker_per_worker() {
    let ran = tally();
    let completions = CountedReceive::unbuffered().wait_for(10, |_| counted_work(&ran, 10));
    assert_eq!(completions, Ok(10));
    assert_eq!(ran.load(Ordering::SeqCst), 10);
}

#[test_log::test]
fn buffered_counted_receive_takes_one_marker_per_worker() {
    let ran = tally();
    assert_eq!(wait_for_all_via_channel(100, |_| counted_work(&ran, 1)), Ok(100));
    assert_eq!(ran.load(Ordering::SeqCst), 100);
}

#[test_log::test]
fn close_and_drain_flushes_every_marker() {
    let mut drained = CloseAndDrain
        .drain_for(10, |i| move || thread::sleep(Duration::from_millis(10 * (i as u64 % 3))))
        .unwrap();
    drained.sort_unstable();
    assert_eq!(drained, (0..10).collect::<Vec<_>>());
    assert_eq!(CloseAndDrain.wait_for(0, |_| || {}), Ok(0));
}

#[test_log::test]
fn counter_wait_surfaces_a_panicking_worker() {
    let result = CounterWait.wait_for(4, |i| {
        move || {
            if i == 2 {
                panic!("worker 2 failed");
            }
        }
    });
    assert_eq!(result, Err(WorkerError::Panicked { index: 2 }));
}

#[test_log::test]
fn close_and_drain_surfaces_a_panicking_worker() {
    let result = CloseAndDrain.drain_for(3, |i| {
        move || {
            if i == 0 {
                panic!("worker 0 failed");
            }
        }
    });
    assert_eq!(result, Err(WorkerError::Panicked { index: 0 }));
}

#[test_log::test]
fn counted_receive_hangs_when_a_worker_never_reports() {
    let outcome = run_with_deadline(
        || {
            CountedReceive::buffered(2)
                .wait_for(2, |i| {
                    move || {
                        if i == 1 {
                            panic!("worker 1 failed");
                        }
                    }
                })
                .ok();
        },
        HANG,
    );
    assert_eq!(outcome, Outcome::TimedOut);
}

#[test_log::test]
fn worker_reporting_on_closed_channel_fails_visibly() {
    let done: Channel<()> = Channel::new(2);
    let handles: Vec<WorkerHandle> = (0..2)
        .map(|i| Worker::new(i, simulated_work(Duration::from_millis(50)), (), done.clone()).spawn())
        .collect();
    done.close().unwrap();

    assert_eq!(done.recv_or_default(), ((), true));
    assert_eq!(done.recv_or_default(), ((), true));

    let errors: Vec<WorkerError> = handles
        .into_iter()
        .filter_map(|handle| handle.join().err())
        .collect();
    assert_eq!(
        errors,
        vec![
            WorkerError::Closed { index: 0 },
            WorkerError::Closed { index: 1 }
        ]
    );
}

#[test_log::test]
fn join_all_reports_first_failure() {
    let done = Channel::new(1);
    let ok = Worker::new(0, || {}, 0, done.clone()).spawn();
    ok.join().unwrap();
    done.close().unwrap();
    let late = Worker::new(1, || {}, 1, done.clone()).spawn();
    assert_eq!(join_all(vec![late]), Err(WorkerError::Closed { index: 1 }));
    assert_eq!(done.recv(), Some(0));
}

#[test_log::test]
fn unbuffered_send_without_receiver_deadlocks() {
    let outcome = run_with_deadline(
        || {
            let done = Channel::new(0);
            done.send(false).ok();
            done.recv();
        },
        Duration::from_secs(2),
    );
    assert_eq!(outcome, Outcome::TimedOut);
}

#[test_log::test]
fn buffered_send_then_receive_completes() {
    let outcome = run_with_deadline(
        || {
            let done = Channel::new(1);
            done.send(false).ok();
            done.recv();
        },
        Duration::from_secs(2),
    );
    assert_eq!(outcome, Outcome::Completed);
}

#[test_log::test]
fn iterating_a_channel_nobody_closes_never_ends() {
    let outcome = run_with_deadline(
        || {
            let done = Channel::new(4);
            done.send(1).ok();
            for _ in done.try_recv_all() {}
        },
        HANG,
    );
    assert_eq!(outcome, Outcome::TimedOut);
}

#[test_log::test]
fn rendezvous_releases_one_sender_per_receive() {
    let done = Channel::new(0);
    let handles: Vec<WorkerHandle> = (0..10)
        .map(|i| Worker::new(i, || {}, i, done.clone()).spawn())
        .collect();

    let mut received = Vec::new();
    for taken in 0..10 {
        thread::sleep(Duration::from_millis(50));
        // Nobody is parked on the channel, so no sender can have handed anything over.
        assert_eq!(done.try_recv(), Err(TryRecvError::Empty));
        let released = handles.iter().filter(|h| h.is_finished()).count();
        assert_eq!(released, taken);

        received.push(done.recv().unwrap());
    }
    join_all(handles).unwrap();

    received.sort_unstable();
    assert_eq!(received, (0..10).collect::<Vec<_>>());
}

#[test_log::test]
fn split_load_and_store_loses_a_completion() {
    let counter = Arc::new(LostUpdateCounter::default());
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let counter = Arc::clone(&counter);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let seen = counter.read();
                barrier.wait();
                counter.write(seen + 1);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(counter.read(), 1);

    // A poller waiting for both completions now waits forever.
    let outcome = run_with_deadline(
        move || {
            while counter.read() < 2 {
                thread::sleep(Duration::from_millis(10));
            }
        },
        HANG,
    );
    assert_eq!(outcome, Outcome::TimedOut);
}
