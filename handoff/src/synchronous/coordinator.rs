//! Coordinators that block the caller until a known number of workers have finished.
//!
//! Three strategies are provided:
//! * [`CountedReceive`] - every worker reports on one channel, the caller receives exactly `n`
//!   times.
//! * [`CloseAndDrain`] - workers report on a channel buffered for all of them while a
//!   [`WaitGroup`] tracks completion; once it reaches zero the channel is closed and drained.
//! * [`CounterWait`] - no channel at all, only a [`WaitGroup`]. Prefer this one when no value
//!   needs to come back from the workers.
//!
//! Polling a plain (non-atomic) counter to decide when to close is not offered: it loses
//! updates, closing too early or waiting forever.
//!
//! A worker whose effect panics never reports on its channel, so [`CountedReceive`] blocks
//! forever in that case. Supervise it with
//! [`run_with_deadline`](super::deadline::run_with_deadline) if that can happen.

use super::channel::Channel;
use super::wait_group::WaitGroup;
use super::worker::{join_all, Worker, WorkerHandle};
use crate::internal::WorkerError;
use std::thread;

/// A strategy for waiting on `n` workers.
pub trait Coordinator {
    /// Spawn `n` workers, building the effect of worker `i` with `spawn(i)`, and block until
    /// all of them have finished.
    ///
    /// Returns the number of completions observed, which is `n` on success. A worker failure
    /// is returned once every worker has been joined.
    fn wait_for<S, F>(&self, n: usize, spawn: S) -> Result<usize, WorkerError>
    where
        S: FnMut(usize) -> F,
        F: FnOnce() + Send + 'static;
}

/// Receive one completion marker per worker from a shared channel.
///
/// The channel is never closed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountedReceive {
    pub capacity: usize,
}

impl CountedReceive {
    /// Every worker rendezvous with the caller.
    pub fn unbuffered() -> Self {
        CountedReceive { capacity: 0 }
    }

    /// Workers can report without waiting for the caller.
    pub fn buffered(capacity: usize) -> Self {
        CountedReceive { capacity }
    }
}

impl Coordinator for CountedReceive {
    fn wait_for<S, F>(&self, n: usize, mut spawn: S) -> Result<usize, WorkerError>
    where
        S: FnMut(usize) -> F,
        F: FnOnce() + Send + 'static,
    {
        let done = Channel::new(self.capacity);
        let handles: Vec<WorkerHandle> = (0..n)
            .map(|index| Worker::new(index, spawn(index), index, done.clone()).spawn())
            .collect();

        let mut completions = 0;
        for _ in 0..n {
            match done.recv() {
                Some(index) => {
                    log::trace!("counted receive: worker {index} reported");
                    completions += 1;
                }
                None => break,
            }
        }
        log::debug!("counted receive: {completions}/{n} workers reported");

        join_all(handles)?;
        Ok(completions)
    }
}

/// Count completions with a [`WaitGroup`], then close the channel and drain it.
///
/// The channel is buffered for every worker, so no send can block and every send happens
/// before the close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloseAndDrain;

impl CloseAndDrain {
    /// Like [`Coordinator::wait_for`], returning the drained markers (worker indices) in
    /// arrival order.
    pub fn drain_for<S, F>(&self, n: usize, mut spawn: S) -> Result<Vec<usize>, WorkerError>
    where
        S: FnMut(usize) -> F,
        F: FnOnce() + Send + 'static,
    {
        let done = Channel::new(n);
        let group = WaitGroup::new();
        let handles: Vec<WorkerHandle> = (0..n)
            .map(|index| Worker::new(index, spawn(index), index, done.clone()).spawn_in(&group))
            .collect();

        group.wait();
        if let Err(err) = done.close() {
            log::warn!("close and drain: {err}");
        }

        let drained: Vec<usize> = done.try_recv_all().collect();
        log::debug!("close and drain: drained {} markers", drained.len());

        join_all(handles)?;
        Ok(drained)
    }
}

impl Coordinator for CloseAndDrain {
    fn wait_for<S, F>(&self, n: usize, spawn: S) -> Result<usize, WorkerError>
    where
        S: FnMut(usize) -> F,
        F: FnOnce() + Send + 'static,
    {
        self.drain_for(n, spawn).map(|drained| drained.len())
    }
}

/// Wait on a [`WaitGroup`] only. No values are exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterWait;

impl Coordinator for CounterWait {
    fn wait_for<S, F>(&self, n: usize, mut spawn: S) -> Result<usize, WorkerError>
    where
        S: FnMut(usize) -> F,
        F: FnOnce() + Send + 'static,
    {
        let group = WaitGroup::new();
        let handles: Vec<_> = (0..n)
            .map(|index| {
                let work = spawn(index);
                let guard = group.enter();
                let handle = thread::spawn(move || {
                    let _guard = guard;
                    work();
                });
                (index, handle)
            })
            .collect();

        group.wait();
        log::debug!("counter wait: {n} workers done");

        let mut result = Ok(n);
        for (index, handle) in handles {
            if handle.join().is_err() && result.is_ok() {
                log::error!("counter wait: worker {index} panicked");
                result = Err(WorkerError::Panicked { index });
            }
        }
        result
    }
}

/// Wait for `n` workers by receiving their markers from a channel buffered for all of them.
pub fn wait_for_all_via_channel<S, F>(n: usize, spawn: S) -> Result<usize, WorkerError>
where
    S: FnMut(usize) -> F,
    F: FnOnce() + Send + 'static,
{
    CountedReceive::buffered(n).wait_for(n, spawn)
}

/// Wait for `n` workers with a [`WaitGroup`].
pub fn wait_for_all_via_counter<S, F>(n: usize, spawn: S) -> Result<usize, WorkerError>
where
    S: FnMut(usize) -> F,
    F: FnOnce() + Send + 'static,
{
    CounterWait.wait_for(n, spawn)
}
