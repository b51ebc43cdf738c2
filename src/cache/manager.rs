//! Cache manager for reusing recent API responses
//!
//! Provides a `CacheManager` that keeps values in memory alongside the instant
//! they were stored, and treats any entry older than its TTL as absent.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};

/// How long a stored response is reused before it is fetched again
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A stored value and the instant it was written
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// When the value was stored
    stored_at: Instant,
}

/// Keeps recently fetched values in memory for a fixed time-to-live
///
/// Every entry shares the TTL given at construction. Expiry is lazy: there is
/// no background sweep, so an expired entry stays in the map until it is read
/// (which removes it) or overwritten by a new `set`.
#[derive(Debug, Clone)]
pub struct CacheManager<V, C = SystemClock> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
    clock: C,
}

impl<V: Clone> CacheManager<V, SystemClock> {
    /// Creates an empty cache with the given TTL, reading time from the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<V: Clone> Default for CacheManager<V, SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V: Clone, C: Clock> CacheManager<V, C> {
    /// Creates an empty cache with the given TTL and time source
    ///
    /// Useful for testing expiry without sleeping.
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
        }
    }

    /// Returns the TTL shared by every entry
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores `value` under `key`, replacing any previous entry and its timestamp
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        tracing::debug!(key = %key, "cache store");
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: self.clock.now(),
            },
        );
    }

    /// Reads the value stored under `key`
    ///
    /// # Returns
    /// * `Some(value)` if an entry exists and is no older than the TTL
    /// * `None` if there is no entry, or the entry has expired. An expired
    ///   entry is removed, so later reads also miss until the next `set`.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        let age = self.clock.now().saturating_duration_since(entry.stored_at);

        if age > self.ttl {
            tracing::debug!(key, age_secs = age.as_secs(), "cache entry expired");
            self.entries.remove(key);
            return None;
        }

        tracing::debug!(key, "cache hit");
        Some(entry.value.clone())
    }

    /// Number of entries currently held, expired-but-unread ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are held
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
