//! Cache Statistics Module
//!
//! Tracks lookups, fetches and swallowed durable-storage failures.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a value
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Fetch operations that completed successfully
    pub fetches: u64,
    /// Fetch operations that failed
    pub fetch_failures: u64,
    /// Durable-storage failures swallowed by the store
    pub durable_errors: u64,
    /// Current number of entries in memory
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the successful fetch counter.
    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    /// Increments the failed fetch counter.
    pub fn record_fetch_failure(&mut self) {
        self.fetch_failures += 1;
    }

    /// Increments the durable error counter.
    pub fn record_durable_error(&mut self) {
        self.durable_errors += 1;
    }

    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_fetch_and_error_counters() {
        let mut stats = CacheStats::new();
        stats.record_fetch();
        stats.record_fetch_failure();
        stats.record_fetch_failure();
        stats.record_durable_error();
        stats.set_total_entries(7);

        assert_eq!(stats.fetches, 1);
        assert_eq!(stats.fetch_failures, 2);
        assert_eq!(stats.durable_errors, 1);
        assert_eq!(stats.total_entries, 7);
    }
}
