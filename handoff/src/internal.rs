//! Primitives shared by the synchronous and tokio backends.
//!
//! Errors here are values, not panics: a send on a closed channel hands the message back
//! to the caller, and a detected deadlock is an ordinary [`Outcome`].

use std::fmt;
use thiserror::Error;

/// Error returned by a send on a closed channel.
///
/// If a message failed to send, the error returns the message back.
#[derive(Error, PartialEq, Eq, Clone, Copy)]
#[error("sending on a closed channel")]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
    /// Recover the message that could not be sent.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SendError { .. }")
    }
}

/// Error returned when a channel is closed a second time.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
#[error("close of closed channel")]
pub struct CloseError;

/// An error returned from [`try_recv`](crate::synchronous::Channel::try_recv).
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryRecvError {
    /// Nothing is ready right now, but the channel is still open.
    #[error("receiving on an empty channel")]
    Empty,
    /// The channel is closed and every queued value has been received.
    #[error("receiving on a closed and drained channel")]
    Closed,
}

/// An error returned from [`recv_timeout`](crate::synchronous::Channel::recv_timeout).
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvTimeoutError {
    #[error("timed out waiting on channel")]
    Timeout,
    #[error("channel is closed and drained")]
    Closed,
}

impl From<TryRecvError> for RecvTimeoutError {
    fn from(err: TryRecvError) -> Self {
        match err {
            TryRecvError::Empty => RecvTimeoutError::Timeout,
            TryRecvError::Closed => RecvTimeoutError::Closed,
        }
    }
}

/// Failure of a worker unit, surfaced to whoever supervises it.
///
/// A worker never swallows these: both indicate a coordination bug in the caller.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum WorkerError {
    /// The completion channel was closed before the worker could report.
    #[error("worker {index} reported on a closed channel")]
    Closed { index: usize },
    /// The worker's effect panicked before it could report.
    #[error("worker {index} panicked")]
    Panicked { index: usize },
}

impl WorkerError {
    pub fn index(&self) -> usize {
        match self {
            WorkerError::Closed { index } | WorkerError::Panicked { index } => *index,
        }
    }
}

/// Result of racing a unit of work against a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The work signalled completion before the deadline.
    Completed,
    /// The deadline elapsed first. The work is still running and has been abandoned.
    TimedOut,
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Outcome::TimedOut)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => f.write_str("completed"),
            Outcome::TimedOut => f.write_str("timed out"),
        }
    }
}
