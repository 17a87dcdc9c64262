//! Counter-based completion: wait until a set of tasks has marked itself done.
//!
//! No values are transferred, so there is no buffering or ordering to get wrong. The counter is
//! atomic; waiters park on a condition variable until it reaches zero.

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Inner {
    count: AtomicUsize,
    lock: Mutex<()>,
    zero: Condvar,
}

/// Waits for a known number of tasks to finish.
///
/// Clones share the same counter.
#[derive(Clone)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new()
    }
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
        WaitGroup {
            inner: Arc::new(Inner {
                count: AtomicUsize::new(0),
                lock: Mutex::new(()),
                zero: Condvar::new(),
            }),
        }
    }

    /// Register `n` more tasks.
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
            let _guard = self.inner.lock.lock();
            self.inner.zero.notify_all();
        }
    }

    /// Register one task and return a guard that marks it done when dropped.
    ///
    /// The guard also fires during unwinding, so a panicking task cannot leave waiters hanging.
    pub fn enter(&self) -> WaitGuard {
        self.add(1);
        WaitGuard { group: self.clone() }
    }

    /// Number of tasks still outstanding.
    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    /// Block until every registered task is done. Returns immediately if none are pending.
    pub fn wait(&self) {
        let mut guard = self.inner.lock.lock();
        while self.count() != 0 {
            self.inner.zero.wait(&mut guard);
        }
    }

    /// Block until every registered task is done or `timeout` elapses.
    ///
    /// Returns `true` if the count reached zero. A timeout too large to represent as an
    /// instant waits without limit.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };
        let mut guard = self.inner.lock.lock();
        while self.count() != 0 {
            if self.inner.zero.wait_until(&mut guard, deadline).timed_out() {
                return self.count() == 0;
            }
        }
        true
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
