use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Completion counter bumped with a separate load and store, as a polling coordinator
/// with an unsynchronized counter would do. Only used to show that it loses updates.
#[derive(Debug, Default)]
pub struct LostUpdateCounter {
    value: AtomicUsize,
}

impl LostUpdateCounter {
    pub fn read(&self) -> usize {
        self.value.load(Ordering::Relaxed)
    }

    pub fn write(&self, value: usize) {
        self.value.store(value, Ordering::Relaxed)
    }
}

/// Shared tally of effects that actually ran.
pub fn tally() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

/// An effect that sleeps for `millis` then bumps `tally`.
pub fn counted_work(tally: &Arc<AtomicUsize>, millis: u64) -> impl FnOnce() + Send + 'static {
    let tally = Arc::clone(tally);
    move || {
        std::thread::sleep(Duration::from_millis(millis));
        tally.fetch_add(1, Ordering::SeqCst);
    }
}
