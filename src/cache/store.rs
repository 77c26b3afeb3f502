//! Cache Store Module
//!
//! The cache engine: a hash index over an arena-backed recency list, with
//! bound enforcement, TTL expiration and activity counters, all guarded by
//! a single readers-writer lock.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;

use crate::cache::entry::unix_nano_now;
use crate::cache::list::EntryList;
use crate::cache::{
    match_pattern, CacheEntry, CacheValue, Statistics, DEFAULT_MAX_SIZE, NO_EXPIRATION,
    NO_MAX_MEMORY_USAGE, NO_MAX_SIZE,
};
use crate::error::{CacheError, Result};

// == Eviction Policy ==
/// Decides which reads reorder the recency list.
///
/// The eviction victim is always the current tail; the policies differ only
/// in how entries drift there. Under FIFO reads never reorder, so the tail
/// is the oldest insertion. Under LRU reads promote to head, so the tail is
/// the least recently accessed entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    #[default]
    FirstInFirstOut,
    LeastRecentlyUsed,
}

// == Cache Inner ==
/// Mutable cache state guarded by the lock.
#[derive(Debug)]
pub(crate) struct CacheInner {
    /// Key to arena-slot index
    pub(crate) index: HashMap<String, usize>,
    /// Recency list owning the entries
    pub(crate) list: EntryList,
    /// Running sum of entry sizes, maintained only when the memory bound
    /// is active
    pub(crate) memory_usage: usize,
    /// Activity counters
    pub(crate) stats: Statistics,
}

impl CacheInner {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            list: EntryList::new(),
            memory_usage: 0,
            stats: Statistics::new(),
        }
    }
}

// == Cache ==
/// Concurrency-safe in-memory key/value cache.
///
/// Capacity can be bounded by entry count, by approximate memory usage, or
/// both; overflow evicts from the tail of the recency list according to the
/// configured [`EvictionPolicy`]. Entries may carry a TTL and are removed
/// lazily on read or by a sweep (see `delete_expired` and the janitor).
///
/// All methods take `&self`; the cache embeds its own readers-writer lock
/// and can be shared across threads behind an `Arc`.
///
/// # Example
/// ```
/// use snapcache::{Cache, CacheValue, EvictionPolicy};
///
/// let cache = Cache::new()
///     .with_max_size(10_000)
///     .with_eviction_policy(EvictionPolicy::LeastRecentlyUsed);
///
/// cache.set("user:1", "alice");
/// assert_eq!(cache.get("user:1"), Some(CacheValue::from("alice")));
/// ```
#[derive(Debug)]
pub struct Cache {
    /// Maximum number of entries, or [`NO_MAX_SIZE`]
    pub(crate) max_size: usize,
    /// Maximum approximate memory in bytes, or [`NO_MAX_MEMORY_USAGE`]
    pub(crate) max_memory: usize,
    pub(crate) policy: EvictionPolicy,
    pub(crate) inner: RwLock<CacheInner>,
    /// Shutdown signal for a running janitor, if any
    pub(crate) janitor_shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl Cache {
    // == Constructor ==
    /// Creates an empty cache with the default configuration: entry count
    /// capped at [`DEFAULT_MAX_SIZE`], no memory bound, FIFO eviction.
    pub fn new() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            max_memory: NO_MAX_MEMORY_USAGE,
            policy: EvictionPolicy::default(),
            inner: RwLock::new(CacheInner::new()),
            janitor_shutdown: Mutex::new(None),
        }
    }

    // == Configuration ==
    /// Sets the maximum number of entries. [`NO_MAX_SIZE`] disables
    /// count-based eviction.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Sets the maximum approximate memory usage in bytes.
    /// [`NO_MAX_MEMORY_USAGE`] disables memory-based eviction.
    ///
    /// Accounting is approximate: each entry is costed as a structural
    /// constant plus key and value byte lengths.
    pub fn with_max_memory(mut self, max_memory: usize) -> Self {
        self.max_memory = max_memory;
        self
    }

    /// Sets the eviction policy. Defaults to FIFO.
    pub fn with_eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the configured entry-count cap.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the configured memory cap in bytes.
    pub fn max_memory(&self) -> usize {
        self.max_memory
    }

    /// Returns the configured eviction policy.
    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.policy
    }

    // == Set ==
    /// Creates or updates a key with a value that never expires.
    pub fn set(&self, key: impl Into<String>, value: impl Into<CacheValue>) {
        self.set_with_ttl(key, value, None);
    }

    /// Creates or updates a key with an optional time-to-live.
    ///
    /// `None` means the entry never expires. A zero TTL creates an entry
    /// that is expired from birth. Writes always move the entry to the
    /// head of the recency list, then enforce the configured bounds: one
    /// eviction at most for the count bound, as many as needed for the
    /// memory bound.
    pub fn set_with_ttl(
        &self,
        key: impl Into<String>,
        value: impl Into<CacheValue>,
        ttl: Option<Duration>,
    ) {
        let key = key.into();
        let value = value.into();
        let expiration = expiration_from_ttl(ttl);

        let mut guard = self.inner.write();
        let inner = &mut *guard;

        match inner.index.get(&key).copied() {
            None => {
                let mut entry = CacheEntry::new(key.clone(), value);
                entry.expiration = expiration;
                let size = entry.size_in_bytes();
                let idx = inner.list.alloc(entry);
                inner.list.push_head(idx);
                inner.index.insert(key, idx);
                if self.max_memory != NO_MAX_MEMORY_USAGE {
                    inner.memory_usage += size;
                }
            }
            Some(idx) => {
                if self.max_memory != NO_MAX_MEMORY_USAGE {
                    inner.memory_usage -= inner.list.entry(idx).size_in_bytes();
                }
                let entry = inner.list.entry_mut(idx);
                entry.value = value;
                entry.expiration = expiration;
                if self.max_memory != NO_MAX_MEMORY_USAGE {
                    inner.memory_usage += inner.list.entry(idx).size_in_bytes();
                }
                inner.list.move_to_head(idx);
            }
        }

        // Nothing to enforce on an unbounded cache
        if self.max_size == NO_MAX_SIZE && self.max_memory == NO_MAX_MEMORY_USAGE {
            return;
        }
        // A single insert can overflow the count bound by at most one
        if self.max_size != NO_MAX_SIZE && inner.index.len() > self.max_size {
            self.evict_locked(inner);
        }
        // A single large insert can require several evictions
        if self.max_memory != NO_MAX_MEMORY_USAGE {
            while inner.memory_usage > self.max_memory && !inner.index.is_empty() {
                self.evict_locked(inner);
            }
        }
    }

    /// Creates or updates multiple keys, none of them expiring.
    ///
    /// Equivalent to repeated `set` calls; there is no atomicity across
    /// keys.
    pub fn set_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, CacheValue)>,
    {
        for (key, value) in entries {
            self.set_with_ttl(key, value, None);
        }
    }

    // == Get ==
    /// Retrieves the value for a key.
    ///
    /// Returns `None` when the key is absent or expired; an expired entry
    /// is removed on the spot. A lookup that finds an entry counts as a
    /// hit even when the entry turns out to be expired. Under LRU a
    /// successful read refreshes the entry's timestamp and promotes it to
    /// the head of the recency list.
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let Some(&idx) = inner.index.get(key) else {
            inner.stats.record_miss();
            return None;
        };
        inner.stats.record_hit();

        if inner.list.entry(idx).is_expired() {
            self.remove_locked(inner, key);
            return None;
        }

        if self.policy == EvictionPolicy::LeastRecentlyUsed {
            inner.list.entry_mut(idx).accessed();
            inner.list.move_to_head(idx);
        }
        Some(inner.list.entry(idx).value.clone())
    }

    /// Retrieves multiple keys at once.
    ///
    /// Every requested key appears in the result; absent or expired keys
    /// map to [`CacheValue::Null`], which makes them indistinguishable
    /// from a genuinely stored `Null`.
    pub fn get_all<S: AsRef<str>>(&self, keys: &[S]) -> HashMap<String, CacheValue> {
        let mut values = HashMap::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            values.insert(
                key.to_string(),
                self.get(key).unwrap_or(CacheValue::Null),
            );
        }
        values
    }

    // == Delete ==
    /// Removes a key. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        let mut guard = self.inner.write();
        self.remove_locked(&mut guard, key)
    }

    /// Removes multiple keys. Returns how many were present.
    pub fn delete_all<S: AsRef<str>>(&self, keys: &[S]) -> usize {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        let mut deleted = 0;
        for key in keys {
            if self.remove_locked(inner, key.as_ref()) {
                deleted += 1;
            }
        }
        deleted
    }

    // == Count ==
    /// Number of entries, including expired ones not yet swept.
    pub fn count(&self) -> usize {
        self.inner.read().index.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    // == Clear ==
    /// Removes every entry. Statistics are preserved.
    pub fn clear(&self) {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        inner.index.clear();
        inner.list.clear();
        inner.memory_usage = 0;
    }

    // == TTL ==
    /// Returns the remaining time until the key expires.
    ///
    /// Fails with [`CacheError::KeyDoesNotExist`] when the key is absent
    /// or already past its deadline (the sweep just hasn't caught it yet),
    /// and with [`CacheError::KeyHasNoExpiration`] when the entry never
    /// expires.
    pub fn ttl(&self, key: &str) -> Result<Duration> {
        let expiration = {
            let guard = self.inner.read();
            let &idx = guard.index.get(key).ok_or(CacheError::KeyDoesNotExist)?;
            guard.list.entry(idx).expiration
        };
        if expiration == NO_EXPIRATION {
            return Err(CacheError::KeyHasNoExpiration);
        }
        let remaining = expiration - unix_nano_now();
        if remaining < 0 {
            return Err(CacheError::KeyDoesNotExist);
        }
        Ok(Duration::from_nanos(remaining as u64))
    }

    // == Expire ==
    /// Replaces a key's expiration. `None` makes the entry permanent.
    ///
    /// Changing a lifetime is not an access: the entry's position in the
    /// recency list stays put even under LRU. Returns false when the key
    /// is absent or already expired.
    pub fn expire(&self, key: &str, ttl: Option<Duration>) -> bool {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        let Some(&idx) = inner.index.get(key) else {
            return false;
        };
        let entry = inner.list.entry_mut(idx);
        if entry.is_expired() {
            return false;
        }
        entry.expiration = expiration_from_ttl(ttl);
        true
    }

    // == Pattern Search ==
    /// Collects keys matching a glob pattern.
    ///
    /// A `limit` above zero stops the search once that many keys have
    /// matched; zero means no limit. The search is not an access: it does
    /// not touch statistics, list order or expired entries, so callers may
    /// see keys whose values a `get` would no longer return. No ordering
    /// is guaranteed.
    pub fn get_keys_by_pattern(&self, pattern: &str, limit: usize) -> Vec<String> {
        let guard = self.inner.read();
        let mut matching_keys = Vec::new();
        for key in guard.index.keys() {
            if match_pattern(pattern, key) {
                matching_keys.push(key.clone());
                if limit > 0 && matching_keys.len() >= limit {
                    break;
                }
            }
        }
        matching_keys
    }

    // == Delete Expired ==
    /// Sweeps the cache, removing every expired entry.
    ///
    /// Returns the number of entries removed and records them in the
    /// expired-keys counter. The janitor calls this periodically; it is
    /// also usable directly.
    pub fn delete_expired(&self) -> usize {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let expired_keys: Vec<String> = inner
            .list
            .iter_oldest_first()
            .filter(|entry| entry.is_expired())
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_locked(inner, key);
            inner.stats.record_expiration();
        }
        expired_keys.len()
    }

    // == Memory Usage ==
    /// Current approximate memory usage in bytes.
    ///
    /// Always zero when no memory bound is configured; the counter is only
    /// maintained while the bound is active.
    pub fn memory_usage(&self) -> usize {
        self.inner.read().memory_usage
    }

    // == Stats ==
    /// Returns a snapshot of the activity counters.
    pub fn stats(&self) -> Statistics {
        self.inner.read().stats.clone()
    }

    // == Internal ==
    /// Removes a key under the lock: unlinks the entry, releases its slot,
    /// maintains the memory counter. Returns whether the key was present.
    fn remove_locked(&self, inner: &mut CacheInner, key: &str) -> bool {
        match inner.index.remove(key) {
            Some(idx) => {
                let entry = inner.list.release(idx);
                if self.max_memory != NO_MAX_MEMORY_USAGE {
                    inner.memory_usage -= entry.size_in_bytes();
                }
                true
            }
            None => false,
        }
    }

    /// Evicts the entry at the tail of the recency list.
    pub(crate) fn evict_locked(&self, inner: &mut CacheInner) {
        let Some(tail_idx) = inner.list.tail() else {
            return;
        };
        let entry = inner.list.release(tail_idx);
        inner.index.remove(&entry.key);
        if self.max_memory != NO_MAX_MEMORY_USAGE {
            inner.memory_usage -= entry.size_in_bytes();
        }
        inner.stats.record_eviction();
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts an optional TTL to a stored deadline.
fn expiration_from_ttl(ttl: Option<Duration>) -> i64 {
    match ttl {
        // Saturate rather than overflow for absurdly long lifetimes
        Some(d) => unix_nano_now().saturating_add(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)),
        None => NO_EXPIRATION,
    }
}

// == Test Helpers ==
#[cfg(test)]
impl Cache {
    /// Key currently at the head of the recency list.
    pub(crate) fn head_key(&self) -> Option<String> {
        let guard = self.inner.read();
        guard.list.head().map(|idx| guard.list.entry(idx).key.clone())
    }

    /// Key currently at the tail of the recency list.
    pub(crate) fn tail_key(&self) -> Option<String> {
        let guard = self.inner.read();
        guard.list.tail().map(|idx| guard.list.entry(idx).key.clone())
    }

    /// Asserts the structural invariants: the list walked in both
    /// directions agrees with itself and with the index, and the memory
    /// counter matches a recount when the bound is active.
    pub(crate) fn assert_consistent(&self) {
        let guard = self.inner.read();

        let forward: Vec<String> = guard.list.iter_oldest_first().map(|e| e.key.clone()).collect();
        let mut backward: Vec<String> =
            guard.list.iter_newest_first().map(|e| e.key.clone()).collect();
        backward.reverse();
        assert_eq!(forward, backward, "list directions disagree");

        assert_eq!(forward.len(), guard.index.len(), "list and index disagree on size");
        for key in &forward {
            assert!(guard.index.contains_key(key), "list key {key} missing from index");
        }

        if self.max_memory != NO_MAX_MEMORY_USAGE {
            let recounted: usize = guard
                .index
                .values()
                .map(|&idx| guard.list.entry(idx).size_in_bytes())
                .sum();
            assert_eq!(recounted, guard.memory_usage, "memory counter out of sync");
        }
    }
}
