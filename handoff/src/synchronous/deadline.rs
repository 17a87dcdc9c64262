//! Race a unit of work against a deadline to tell "finished" apart from "blocked forever".
//!
//! This does not cancel anything. Work that misses its deadline keeps running on its thread
//! until it finishes or the process exits, and whatever it holds stays held.

use crate::internal::Outcome;
use crossbeam_channel::{after, bounded, select};
use std::thread;
use std::time::Duration;

/// Run `f` on a detached thread and wait at most `deadline` for it to return.
///
/// Work that panics never signals completion and is reported as [`Outcome::TimedOut`] once
/// the deadline passes.
pub fn run_with_deadline<F>(f: F, deadline: Duration) -> Outcome
where
    F: FnOnce() + Send + 'static,
{
    let (tx, rx) = bounded::<()>(1);
    thread::spawn(move || {
        f();
        if tx.send(()).is_err() {
            log::trace!("deadline: work finished after its supervisor gave up");
        }
    });

    let timer = after(deadline);
    let outcome = select! {
        recv(rx) -> signal => match signal {
            Ok(()) => Outcome::Completed,
            Err(_) => {
                log::warn!("deadline: work exited without signalling");
                timer.recv().ok();
                Outcome::TimedOut
            }
        },
        recv(timer) -> _ => Outcome::TimedOut,
    };

    log::debug!("deadline: {outcome} within {deadline:?}");
    outcome
}
