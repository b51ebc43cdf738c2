//! In-memory response cache
//!
//! This module provides a small TTL cache used by the catalog client to avoid
//! repeating identical requests within a short window. Entries are never
//! written to disk and expire lazily: an entry older than the TTL is removed
//! by the read that finds it.

mod clock;
mod manager;


pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{CacheManager, DEFAULT_TTL};
