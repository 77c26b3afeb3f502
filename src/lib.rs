//! Snapcache - an embeddable bounded in-memory key/value cache
//!
//! Provides a concurrency-safe cache with TTL expiration, FIFO/LRU
//! eviction driven by entry count and approximate memory usage, wildcard
//! key search and binary snapshot persistence. The cache is a library
//! building block meant to be shared inside an application, not a
//! networked service.
//!
//! # Example
//! ```
//! use snapcache::{Cache, CacheValue, EvictionPolicy};
//!
//! let cache = Cache::new()
//!     .with_max_size(10_000)
//!     .with_eviction_policy(EvictionPolicy::LeastRecentlyUsed);
//!
//! cache.set("session:1", "alice");
//! assert_eq!(cache.get("session:1"), Some(CacheValue::from("alice")));
//! assert_eq!(cache.get("session:2"), None);
//! ```

pub mod cache;
pub mod error;

mod tasks;

pub use cache::{
    match_pattern, Cache, CacheEntry, CacheValue, EvictionPolicy, Statistics, DEFAULT_MAX_SIZE,
    GIGABYTE, KILOBYTE, MEGABYTE, NO_EXPIRATION, NO_MAX_MEMORY_USAGE, NO_MAX_SIZE,
};
pub use error::{CacheError, Result};
