//! Async worker unit: awaits one effect, then reports once on an mpsc channel.

use crate::internal::WorkerError;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A container for an async unit of work and the channel it reports completion on.
pub struct Worker<M, F> {
    index: usize,
    work: F,
    marker: M,
    done: mpsc::Sender<M>,
}

impl<M, F> fmt::Debug for Worker<M, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<M, F> Worker<M, F>
where
    M: Send + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    pub fn new(index: usize, work: F, marker: M, done: mpsc::Sender<M>) -> Self {
        Worker {
            index,
            work,
            marker,
            done,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Await the effect, then make exactly one send attempt.
    pub async fn run(self) -> Result<(), WorkerError> {
        let Worker {
            index,
            work,
            marker,
            done,
        } = self;

        log::trace!("worker {index}: started");
        work.await;

        if done.send(marker).await.is_err() {
            log::error!("worker {index}: completion channel closed before reporting");
            return Err(WorkerError::Closed { index });
        }
        log::trace!("worker {index}: reported");
        Ok(())
    }

    /// Run the worker as a tokio task.
    ///
    /// Dropping the handle detaches the task; it is neither aborted nor joined.
    pub fn spawn(self) -> WorkerHandle {
        let index = self.index;
        let handle = tokio::spawn(self.run());
        WorkerHandle { index, handle }
    }
}

/// Handle to a spawned async worker.
#[derive(Debug)]
pub struct WorkerHandle {
    index: usize,
    handle: JoinHandle<Result<(), WorkerError>>,
}

impl WorkerHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn join(self) -> Result<(), WorkerError> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) => {
                log::error!("worker {}: {err}", self.index);
                Err(WorkerError::Panicked { index: self.index })
            }
        }
    }
}

/// Join every handle, returning the first failure after all tasks have finished.
pub async fn join_all<I>(handles: I) -> Result<(), WorkerError>
where
    I: IntoIterator<Item = WorkerHandle>,
{
    let mut result = Ok(());
    for handle in handles {
        if let Err(err) = handle.join().await {
            if result.is_ok() {
                result = Err(err);
            }
        }
    }
    result
}

/// Stand-in effect that takes `duration` to complete without blocking the runtime.
pub async fn simulated_work(duration: Duration) {
    log::info!("working...");
    tokio::time::sleep(duration).await;
    log::info!("done");
}
