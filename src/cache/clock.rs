//! Time sources for the response cache

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of monotonic instants used to stamp and age cache entries
pub trait Clock {
    /// Returns the current instant
    fn now(&self) -> Instant;
}

/// Clock backed by `Instant::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
///
/// Clones share the same underlying time, so a test can hand one clone to a
/// `CacheManager` and keep another to advance it.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Creates a clock frozen at the moment of construction
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Moves the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
