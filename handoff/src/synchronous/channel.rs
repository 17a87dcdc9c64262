//! A blocking channel with Go-style capacity and close semantics.
//!
//! A capacity of zero makes every send a rendezvous: the value is only handed over while a
//! receiver is parked waiting for it, and the sender resumes once that receiver has taken it.
//! Any other capacity gives a bounded FIFO queue.

use crate::internal::{CloseError, RecvTimeoutError, SendError, TryRecvError};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct State<T> {
    queue: VecDeque<T>,
    closed: bool,
    /// Receivers parked on `not_empty`.
    waiting: usize,
    /// Number of values ever pushed. The n-th pushed value carries ticket n.
    sent: u64,
    /// Number of values ever popped.
    received: u64,
}

impl<T> State<T> {
    fn push(&mut self, value: T) -> u64 {
        let ticket = self.sent;
        self.queue.push_back(value);
        self.sent += 1;
        ticket
    }

    fn pop(&mut self) -> Option<T> {
        let value = self.queue.pop_front()?;
        self.received += 1;
        Some(value)
    }
}

struct Shared<T> {
    capacity: usize,
    state: Mutex<State<T>>,
    not_empty: Condvar,
    /// Senders wait here for room, for a receiver to arrive, or for their rendezvous to finish.
    not_full: Condvar,
}

/// A multi-producer multi-consumer channel.
///
/// `Channel` is a handle: cloning it shares the same queue. Dropping handles does not close
/// the channel, only [`close`](Channel::close) does.
pub struct Channel<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Channel {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Channel")
            .field("capacity", &self.shared.capacity)
            .field("queued", &state.queue.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl<T> Channel<T> {
    /// Create a channel holding up to `capacity` pending values.
    ///
    /// `0` creates an unbuffered channel.
    pub fn new(capacity: usize) -> Self {
        Channel {
            shared: Arc::new(Shared {
                capacity,
                state: Mutex::new(State {
                    queue: VecDeque::with_capacity(capacity),
                    closed: false,
                    waiting: 0,
                    sent: 0,
                    received: 0,
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Number of values buffered in the channel.
    ///
    /// Always zero for an unbuffered channel: a value in a rendezvous is never at rest.
    pub fn len(&self) -> usize {
        if self.shared.capacity == 0 {
            return 0;
        }
        self.shared.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Send a value, blocking until it is buffered or taken by a receiver.
    ///
    /// Fails with [`SendError`] if the channel is closed, including when it is closed while
    /// this call is blocked waiting for room.
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        let shared = &*self.shared;
        let mut state = shared.state.lock();
        loop {
            if state.closed {
                log::trace!("send: channel is closed");
                return Err(SendError(value));
            }

            if shared.capacity > 0 {
                if state.queue.len() < shared.capacity {
                    state.push(value);
                    shared.not_empty.notify_one();
                    return Ok(());
                }
            } else if state.waiting > state.queue.len() {
                // A parked receiver is guaranteed to pop this value even if the channel closes.
                let ticket = state.push(value);
                shared.not_empty.notify_one();
                while state.received <= ticket {
                    shared.not_full.wait(&mut state);
                }
                log::trace!("send: rendezvous {ticket} complete");
                return Ok(());
            }

            shared.not_full.wait(&mut state);
        }
    }

    /// Receive the next value, blocking while the channel is open and empty.
    ///
    /// Returns `None` once the channel is closed and drained, and never blocks after that.
    pub fn recv(&self) -> Option<T> {
        match self.recv_until(None) {
            Ok(value) => Some(value),
            Err(_) => None,
        }
    }

    /// Receive like [`recv`](Channel::recv), reporting exhaustion as `(T::default(), true)`.
    ///
    /// The flag is `false` for every real value.
    pub fn recv_or_default(&self) -> (T, bool)
    where
        T: Default,
    {
        match self.recv() {
            Some(value) => (value, false),
            None => (T::default(), true),
        }
    }

    /// Receive a value only if one is ready now.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let mut state = self.shared.state.lock();
        if let Some(value) = state.pop() {
            self.shared.not_full.notify_all();
            return Ok(value);
        }
        if state.closed {
            return Err(TryRecvError::Closed);
        }
        Err(TryRecvError::Empty)
    }

    /// Receive a value, giving up after `timeout`.
    ///
    /// A timeout too large to represent as an instant waits without limit.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.recv_until(Instant::now().checked_add(timeout))
    }

    fn recv_until(&self, deadline: Option<Instant>) -> Result<T, RecvTimeoutError> {
        let shared = &*self.shared;
        let mut state = shared.state.lock();
        loop {
            if let Some(value) = state.pop() {
                shared.not_full.notify_all();
                return Ok(value);
            }
            if state.closed {
                return Err(RecvTimeoutError::Closed);
            }

            state.waiting += 1;
            // An unbuffered sender may be waiting for a receiver to show up.
            shared.not_full.notify_all();
            let timed_out = match deadline {
                Some(deadline) => shared.not_empty.wait_until(&mut state, deadline).timed_out(),
                None => {
                    shared.not_empty.wait(&mut state);
                    false
                }
            };
            state.waiting -= 1;

            if timed_out {
                if let Some(value) = state.pop() {
                    shared.not_full.notify_all();
                    return Ok(value);
                }
                if state.closed {
                    return Err(RecvTimeoutError::Closed);
                }
                return Err(RecvTimeoutError::Timeout);
            }
        }
    }

    /// Close the channel.
    ///
    /// Queued values stay receivable. Blocked receivers with nothing left to take wake up and
    /// observe the close, and blocked senders fail. Closing twice is an error.
    pub fn close(&self) -> Result<(), CloseError> {
        let mut state = self.shared.state.lock();
        if state.closed {
            log::warn!("close: channel already closed");
            return Err(CloseError);
        }
        state.closed = true;
        log::debug!("close: {} values left to drain", state.queue.len());
        drop(state);

        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();
        Ok(())
    }

    /// Iterate over every value until the channel is closed and drained.
    ///
    /// The iterator blocks between values. On a channel that nobody closes it never ends, so
    /// only start it once every sender is known to have finished or someone owns the close.
    pub fn try_recv_all(&self) -> RecvAll<'_, T> {
        RecvAll { channel: self }
    }
}

/// Blocking iterator returned by [`Channel::try_recv_all`].
#[derive(Debug)]
pub struct RecvAll<'a, T> {
    channel: &'a Channel<T>,
}

impl<T> Iterator for RecvAll<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.channel.recv()
    }
}

impl<'a, T> IntoIterator for &'a Channel<T> {
    type Item = T;
    type IntoIter = RecvAll<'a, T>;

    fn into_iter(self) -> RecvAll<'a, T> {
        self.try_recv_all()
    }
}
