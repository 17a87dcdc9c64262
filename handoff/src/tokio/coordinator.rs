//! Async coordinators that wait for a known number of tasks.

use super::wait_group::WaitGroup;
use super::worker::{join_all, Worker, WorkerHandle};
use crate::internal::WorkerError;
use std::future::Future;
use tokio::sync::mpsc;

/// Spawn `n` workers reporting on a channel buffered for all of them and receive `n` markers.
///
/// The caller keeps no sender, so if a worker dies before reporting the channel disconnects
/// instead of hanging, and the failure comes back from the join.
pub async fn wait_for_all_via_channel<S, F>(n: usize, mut spawn: S) -> Result<usize, WorkerError>
where
    S: FnMut(usize) -> F,
    F: Future<Output = ()> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel(n.max(1));
    let handles: Vec<WorkerHandle> = (0..n)
        .map(|index| Worker::new(index, spawn(index), index, tx.clone()).spawn())
        .collect();
    drop(tx);

    let mut completions = 0;
    while completions < n {
        match rx.recv().await {
            Some(index) => {
                log::trace!("counted receive: worker {index} reported");
                completions += 1;
            }
            None => break,
        }
    }
    log::debug!("counted receive: {completions}/{n} workers reported");

    join_all(handles).await?;
    Ok(completions)
}

/// Spawn `n` tasks tracked by a [`WaitGroup`] and wait for it to reach zero.
pub async fn wait_for_all_via_counter<S, F>(n: usize, mut spawn: S) -> Result<usize, WorkerError>
where
    S: FnMut(usize) -> F,
    F: Future<Output = ()> + Send + 'static,
{
    let group = WaitGroup::new();
    let handles: Vec<_> = (0..n)
        .map(|index| {
            let work = spawn(index);
            let guard = group.enter();
            let handle = tokio::spawn(async move {
                let _guard = guard;
                work.await;
            });
            (index, handle)
        })
        .collect();

    group.wait().await;
    log::debug!("counter wait: {n} tasks done");

    let mut result = Ok(n);
    for (index, handle) in handles {
        if let Err(err) = handle.await {
            log::error!("counter wait: task {index}: {err}");
            if result.is_ok() {
                result = Err(WorkerError::Panicked { index });
            }
        }
    }
    result
}
