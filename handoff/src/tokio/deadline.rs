//! Race a future against a deadline.
//!
//! The future runs as its own task and is not aborted when the deadline passes; it keeps
//! running until it finishes or the runtime shuts down.

use crate::internal::Outcome;
use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{self, Instant};

/// Spawn `future` and wait at most `deadline` for it to complete.
///
/// A task that panics never signals and is reported as [`Outcome::TimedOut`] at the deadline.
pub async fn run_with_deadline<F>(future: F, deadline: Duration) -> Outcome
where
    F: Future<Output = ()> + Send + 'static,
{
    let start = Instant::now();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        future.await;
        if tx.send(()).is_err() {
            log::trace!("deadline: task finished after its supervisor gave up");
        }
    });

    let outcome = match time::timeout(deadline, rx).await {
        Ok(Ok(())) => Outcome::Completed,
        Ok(Err(_)) => {
            log::warn!("deadline: task exited without signalling");
            match start.checked_add(deadline) {
                Some(expires) => time::sleep_until(expires).await,
                None => std::future::pending::<()>().await,
            }
            Outcome::TimedOut
        }
        Err(_) => Outcome::TimedOut,
    };

    log::debug!("deadline: {outcome} within {deadline:?}");
    outcome
}
