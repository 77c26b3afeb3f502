//! Cache Module
//!
//! In-memory key/value caching with bounded capacity, approximate memory
//! accounting, TTL expiration, FIFO/LRU eviction and snapshot persistence.

mod entry;
mod list;
mod pattern;
mod persistence;
mod stats;
mod store;
mod value;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use pattern::match_pattern;
pub use stats::Statistics;
pub use store::{Cache, EvictionPolicy};
pub use value::CacheValue;

// == Public Constants ==
/// Entry-count cap value meaning "no maximum number of entries".
///
/// A cache configured with this value never evicts based on entry count.
pub const NO_MAX_SIZE: usize = 0;

/// Memory cap value meaning "no maximum memory usage".
///
/// A cache configured with this value never evicts based on memory usage
/// and does not maintain the running usage counter.
pub const NO_MAX_MEMORY_USAGE: usize = 0;

/// Entry-count cap applied when none is specified.
pub const DEFAULT_MAX_SIZE: usize = 100_000;

/// Stored expiration value for entries that never expire.
pub const NO_EXPIRATION: i64 = -1;

pub const KILOBYTE: usize = 1024;
pub const MEGABYTE: usize = 1024 * KILOBYTE;
pub const GIGABYTE: usize = 1024 * MEGABYTE;
