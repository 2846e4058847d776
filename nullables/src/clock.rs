//! Nullable clock: deterministic time for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use dagcore_types::{Clock, Timestamp};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. Units are protocol ticks.
#[derive(Debug, Default)]
pub struct NullClock {
    current: AtomicU64,
}

impl NullClock {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            current: AtomicU64::new(initial.ticks()),
        }
    }

    /// Advance time by a number of ticks.
    pub fn advance(&self, ticks: u64) {
        self.current.fetch_add(ticks, Ordering::SeqCst);
    }

    /// Set the time to a specific value.
    pub fn set(&self, time: Timestamp) {
        self.current.store(time.ticks(), Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::SeqCst))
    }
}
