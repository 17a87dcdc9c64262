//! Async counterpart of [`crate::synchronous::WaitGroup`].

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Default)]
struct Inner {
    count: AtomicUsize,
    zero: Notify,
}

/// Waits for a known number of tasks to finish. Clones share the same counter.
#[derive(Clone, Default)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

impl fmt::Debug for WaitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitGroup")
            .field("count", &self.count())
            .finish()
    }
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: usize) {
        self.inner.count.fetch_add(n, Ordering::SeqCst);
    }

    /// Mark one task as finished.
    ///
    /// # Panics
    ///
    /// If more tasks are marked done than were added.
    pub fn done(&self) {
        let previous = match self
            .inner
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| count.checked_sub(1))
        {
            Ok(previous) => previous,
            Err(_) => panic!("WaitGroup::done called more times than tasks were added"),
        };

        if previous == 1 {
            self.inner.zero.notify_waiters();
        }
    }

    /// Register one task and return a guard that marks it done when dropped.
    pub fn enter(&self) -> WaitGuard {
        self.add(1);
        WaitGuard { group: self.clone() }
    }

    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    /// Wait until every registered task is done.
    pub async fn wait(&self) {
        loop {
            // Registered before the check so a concurrent `done` cannot be missed.
            let notified = self.inner.zero.notified();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Marks one task of a [`WaitGroup`] done on drop.
#[derive(Debug)]
#[must_use = "dropping the guard marks the task done immediately"]
pub struct WaitGuard {
    group: WaitGroup,
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        self.group.done();
    }
}
