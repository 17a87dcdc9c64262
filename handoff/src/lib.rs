//! Channels for handing values between concurrently running units of work, and the
//! patterns for waiting on those units built on top of them.
//!
//! A [`Channel`](synchronous::Channel) has a fixed capacity chosen at construction:
//! * `0` - unbuffered. Every send is a rendezvous with a receiver.
//! * `n > 0` - a FIFO queue holding up to `n` pending values.
//!
//! A channel is closed explicitly, exactly once. Closing keeps queued values receivable;
//! once the queue is drained every receive returns immediately and every send fails with
//! [`SendError`].
//!
//! On top of the channel the crate provides:
//! * worker units that run an effect and report completion once,
//! * coordinators that block until `n` workers are done (counted receive, close-and-drain,
//!   and a wait group),
//! * [`run_with_deadline`](synchronous::run_with_deadline), which tells work that finished
//!   apart from work that is stuck.
//!
//! There are two backends:
//! * [`synchronous`] - units of work are OS threads.
//! * [`tokio`] - units of work are [tokio](https://tokio.rs) tasks.
//!
//! **Note**: nothing in this crate cancels or joins work it has given up on. A worker that
//! misses a deadline, or whose handle was dropped, keeps running until it finishes or the
//! process exits.
//!
//! # Example
//! We wait for ten workers, each reporting on a shared buffered channel:
//!
//!```
//! use handoff::synchronous::{Channel, Worker};
//!
//! let done = Channel::new(10);
//! for i in 0..10 {
//!     Worker::new(i, || {}, i, done.clone()).spawn();
//! }
//!
//! let mut reported: Vec<usize> = (0..10).map(|_| done.recv().unwrap()).collect();
//! reported.sort();
//! assert_eq!(reported, (0..10).collect::<Vec<_>>());
//!```
//!
//! Or let a coordinator do the bookkeeping:
//!
//!```
//! use handoff::synchronous::{wait_for_all_via_counter, CloseAndDrain};
//!
//! assert_eq!(wait_for_all_via_counter(4, |_| || {}), Ok(4));
//!
//! let drained = CloseAndDrain.drain_for(3, |_| || {}).unwrap();
//! assert_eq!(drained.len(), 3);
//!```
//!
//! An unbuffered send with no receiver never returns. [`Outcome::TimedOut`] says so:
//!
//!```
//! use handoff::synchronous::{run_with_deadline, Channel};
//! use handoff::Outcome;
//! use std::time::Duration;
//!
//! let outcome = run_with_deadline(
//!     || {
//!         let done = Channel::new(0);
//!         done.send(false).ok();
//!     },
//!     Duration::from_millis(100),
//! );
//! assert_eq!(outcome, Outcome::TimedOut);
//!```

pub mod internal;
pub mod scenarios;
pub mod synchronous;
pub mod tokio;

pub use internal::{CloseError, Outcome, RecvTimeoutError, SendError, TryRecvError, WorkerError};
