//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::cache::{CacheValue, NO_EXPIRATION};

/// Fixed per-entry byte overhead used by approximate memory accounting.
///
/// Covers the timestamps, the expiration field, the two list links and the
/// key/value discriminants. Deliberately a rough constant: accounting is
/// approximate by contract.
const STRUCTURAL_OVERHEAD_BYTES: usize = 56;

// == Cache Entry ==
/// A single cached record.
///
/// The recency-list links are not part of the entry: they live in the list
/// node that owns it, which is also why an entry serializes cleanly into a
/// snapshot without any pointer fixup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Unique identifier. Immutable after creation.
    pub key: String,
    /// The stored value. Replaced wholesale on update.
    pub value: CacheValue,
    /// Unix nanosecond timestamp used to order entries when a snapshot is
    /// loaded. Set at creation; refreshed on access only under LRU.
    pub relevant_timestamp: i64,
    /// Absolute unix nanosecond deadline, or [`NO_EXPIRATION`].
    pub expiration: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry with no expiration, timestamped now.
    pub fn new(key: String, value: CacheValue) -> Self {
        Self {
            key,
            value,
            relevant_timestamp: unix_nano_now(),
            expiration: NO_EXPIRATION,
        }
    }

    // == Accessed ==
    /// Marks the entry as accessed, refreshing its timestamp.
    ///
    /// Only meaningful under LRU, where snapshot reconstruction and list
    /// order both follow last access rather than insertion.
    pub fn accessed(&mut self) {
        self.relevant_timestamp = unix_nano_now();
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to its deadline, so a zero TTL produces an
    /// entry that is expired from birth.
    pub fn is_expired(&self) -> bool {
        self.expiration != NO_EXPIRATION && unix_nano_now() >= self.expiration
    }

    // == Size In Bytes ==
    /// Approximate number of bytes this entry occupies.
    ///
    /// Structural overhead plus key length plus the value's own
    /// approximate size.
    pub fn size_in_bytes(&self) -> usize {
        STRUCTURAL_OVERHEAD_BYTES + self.key.len() + self.value.size_in_bytes()
    }
}

// == Utility Functions ==
/// Returns the current unix timestamp in nanoseconds.
pub(crate) fn unix_nano_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_nanos() as i64
}
