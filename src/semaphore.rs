use std::sync::{Condvar, Mutex};

/// Counting semaphore with a blocking acquire.
///
/// One permit is released per enqueued task, plus one per worker during
/// shutdown. The mutex/condvar pair gives each release-to-acquire handoff
/// the memory ordering the dispatch protocol relies on.
pub(crate) struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub(crate) fn new() -> Self {
        Self {
            permits: Mutex::new(0),
            available: Condvar::new(),
        }
    }

    /// Blocks until a permit is available, then consumes it.
    pub(crate) fn acquire(&self) {
        let mut permits = self.permits.lock().unwrap();
        while *permits == 0 {
            permits = self.available.wait(permits).unwrap();
        }
        *permits -= 1;
    }

    /// Makes `count` permits available, waking blocked acquirers.
    pub(crate) fn release(&self, count: usize) {
        if count == 0 {
            return;
        }
        let mut permits = self.permits.lock().unwrap();
        *permits += count;
        if count == 1 {
            self.available.notify_one();
        } else {
            self.available.notify_all();
        }
    }
}
