//! A worker unit: runs one effect on its own thread, then reports once on a completion channel.

use super::channel::Channel;
use super::wait_group::WaitGroup;
use crate::internal::WorkerError;
use std::fmt;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// The effect a worker performs before reporting.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// A container for a unit of work and the channel it reports completion on.
pub struct Worker<M> {
    index: usize,
    work: Work,
    marker: M,
    done: Channel<M>,
}

impl<M> fmt::Debug for Worker<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("index", &self.index)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<M: Send + 'static> Worker<M> {
    /// Build a worker that runs `work` and then sends `marker` on `done`.
    pub fn new<F>(index: usize, work: F, marker: M, done: Channel<M>) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Worker {
            index,
            work: Box::new(work),
            marker,
            done,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Run the effect on the current thread, then make exactly one send attempt.
    pub fn run(self) -> Result<(), WorkerError> {
        let Worker {
            index,
            work,
            marker,
            done,
        } = self;

        log::trace!("worker {index}: started");
        work();

        match done.send(marker) {
            Ok(()) => {
                log::trace!("worker {index}: reported");
                Ok(())
            }
            Err(_) => {
                log::error!("worker {index}: completion channel closed before reporting");
                Err(WorkerError::Closed { index })
            }
        }
    }

    /// Run the worker on a new thread.
    ///
    /// Dropping the returned handle detaches the thread: nothing joins or cancels it, and it
    /// is abandoned if the process exits first.
    pub fn spawn(self) -> WorkerHandle {
        let index = self.index;
        let handle = thread::spawn(move || self.run());
        WorkerHandle { index, handle }
    }

    /// Run the worker on a new thread, registered as one task of `group`.
    ///
    /// The task is marked done after the send attempt, whether it succeeded, failed or the
    /// effect panicked.
    pub fn spawn_in(self, group: &WaitGroup) -> WorkerHandle {
        let index = self.index;
        let guard = group.enter();
        let handle = thread::spawn(move || {
            let _guard = guard;
            self.run()
        });
        WorkerHandle { index, handle }
    }
}

/// Handle to a spawned worker, used to observe how it finished.
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

    /// Wait for the worker thread and return its outcome.
    pub fn join(self) -> Result<(), WorkerError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => {
                log::error!("worker {}: panicked", self.index);
                Err(WorkerError::Panicked { index: self.index })
            }
        }
    }
}

/// Join every handle, returning the first failure after all threads have finished.
pub fn join_all<I>(handles: I) -> Result<(), WorkerError>
where
    I: IntoIterator<Item = WorkerHandle>,
{
    let mut result = Ok(());
    for handle in handles {
        if let Err(err) = handle.join() {
            if result.is_ok() {
                result = Err(err);
            }
        }
    }
    result
}

/// Stand-in effect that takes `duration` to complete.
pub fn simulated_work(duration: Duration) -> impl FnOnce() + Send + 'static {
    move || {
        log::info!("working...");
        thread::sleep(duration);
        log::info!("done");
    }
}
