//! Cache Entry Module
//!
//! Defines a single cached value together with the time it was written.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents the latest known value for a key and when it was written.
///
/// Value and timestamp live in the same struct, so a cached value can never
/// exist without its timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Write timestamp (Unix milliseconds)
    pub written_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self::with_timestamp(key, value, current_timestamp_ms())
    }

    /// Creates an entry with an explicit write timestamp.
    pub fn with_timestamp(key: impl Into<String>, value: V, written_at: u64) -> Self {
        Self {
            key: key.into(),
            value,
            written_at,
        }
    }

    // == Age ==
    /// Returns how long ago the entry was written, measured against `now`.
    ///
    /// A timestamp in the future (clock moved backwards) yields zero.
    pub fn age_at(&self, now: u64) -> Duration {
        Duration::from_millis(now.saturating_sub(self.written_at))
    }

    /// Returns how long ago the entry was written.
    pub fn age(&self) -> Duration {
        self.age_at(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A system clock set before the epoch reads as zero.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
