//! Cache Statistics Module
//!
//! Tracks cache activity counters: hits, misses, evictions and expirations.

use serde::Serialize;

// == Statistics ==
/// Monotonic counters describing cache activity.
///
/// Counters are mutated under the cache lock and only ever grow; `clear`
/// does not reset them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    /// Number of lookups that found an entry (including entries that
    /// turned out to be expired)
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Number of entries removed to satisfy a capacity or memory bound
    pub evicted_keys: u64,
    /// Number of expired entries removed by sweeps
    pub expired_keys: u64,
}

impl Statistics {
    // == Constructor ==
    /// Creates a new Statistics with all counters at zero.
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

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    pub fn record_eviction(&mut self) {
        self.evicted_keys += 1;
    }

    // == Record Expiration ==
    pub fn record_expiration(&mut self) {
        self.expired_keys += 1;
    }
}
