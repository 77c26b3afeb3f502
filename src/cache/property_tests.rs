//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the structural invariants and the statistics,
//! bound-enforcement and ordering contracts over arbitrary op sequences.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::cache::{Cache, CacheValue, EvictionPolicy, KILOBYTE, NO_MAX_SIZE};

// == Strategies ==
/// Generates valid cache keys (non-empty, bounded length)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}".prop_map(|s| s)
}

/// Generates valid cache values (bounded length)
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}".prop_map(|s| s)
}

/// A single cache operation for sequence testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn apply(cache: &Cache, op: &CacheOp) {
    match op {
        CacheOp::Set { key, value } => cache.set(key.clone(), value.clone()),
        CacheOp::Get { key } => {
            let _ = cache.get(key);
        }
        CacheOp::Delete { key } => {
            let _ = cache.delete(key);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, hits and misses reflect exactly the
    // lookups that found or did not find an entry.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let cache = Cache::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in &ops {
            match op {
                CacheOp::Set { key, value } => cache.set(key.clone(), value.clone()),
                CacheOp::Get { key } => match cache.get(key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    let _ = cache.delete(key);
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "misses mismatch");
        prop_assert_eq!(stats.evicted_keys, 0, "no bound configured, nothing may evict");
    }

    // Storing a pair and reading it back returns the stored value.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        let cache = Cache::new();

        cache.set(key.clone(), value.clone());

        prop_assert_eq!(cache.get(&key), Some(CacheValue::from(value)));
    }

    // After a delete, a lookup finds nothing.
    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in valid_value_strategy()) {
        let cache = Cache::new();

        cache.set(key.clone(), value);
        prop_assert!(cache.get(&key).is_some(), "key should exist before delete");

        prop_assert!(cache.delete(&key));
        prop_assert!(cache.get(&key).is_none(), "key should not exist after delete");
    }

    // Writing V1 then V2 under the same key leaves exactly one entry
    // holding V2.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let cache = Cache::new();

        cache.set(key.clone(), value1);
        cache.set(key.clone(), value2.clone());

        prop_assert_eq!(cache.get(&key), Some(CacheValue::from(value2)));
        prop_assert_eq!(cache.count(), 1);
    }

    // The entry count never exceeds the configured cap.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec(
            (valid_key_strategy(), valid_value_strategy()),
            1..200
        )
    ) {
        let max_size = 50;
        let cache = Cache::new().with_max_size(max_size);

        for (key, value) in entries {
            cache.set(key, value);
            prop_assert!(
                cache.count() <= max_size,
                "cache size {} exceeds cap {}",
                cache.count(),
                max_size
            );
        }
        cache.assert_consistent();
    }

    // Walking the list in either direction always agrees with the index.
    #[test]
    fn prop_list_and_index_agree(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let cache = Cache::new().with_max_size(20);

        for op in &ops {
            apply(&cache, op);
            cache.assert_consistent();
        }
    }

    // Same agreement under LRU, where reads reorder the list.
    #[test]
    fn prop_list_and_index_agree_under_lru(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let cache = Cache::new()
            .with_max_size(20)
            .with_eviction_policy(EvictionPolicy::LeastRecentlyUsed);

        for op in &ops {
            apply(&cache, op);
            cache.assert_consistent();
        }
    }

    // Memory usage stays under the bound as long as each entry fits on
    // its own, and the running counter matches a recount.
    #[test]
    fn prop_memory_bound_enforcement(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let max_memory = 4 * KILOBYTE;
        let cache = Cache::new()
            .with_max_size(NO_MAX_SIZE)
            .with_max_memory(max_memory);

        for op in &ops {
            apply(&cache, op);
            prop_assert!(
                cache.memory_usage() <= max_memory,
                "memory usage {} exceeds bound {}",
                cache.memory_usage(),
                max_memory
            );
        }
        cache.assert_consistent();
    }

    // Under FIFO the tail is always the oldest insertion and evictions
    // proceed in insertion order.
    #[test]
    fn prop_fifo_eviction_order(keys in prop::collection::vec(valid_key_strategy(), 3..10)) {
        let unique_keys: Vec<String> = keys
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        prop_assume!(unique_keys.len() >= 3);

        // Cap one below the number of keys: the last insert must evict
        // exactly the first key.
        let cache = Cache::new().with_max_size(unique_keys.len() - 1);
        for key in &unique_keys {
            cache.set(key.clone(), "v");
        }

        prop_assert_eq!(cache.stats().evicted_keys, 1);
        prop_assert!(cache.get(&unique_keys[0]).is_none(), "oldest key must be evicted first");
        for key in unique_keys.iter().skip(1) {
            prop_assert!(cache.get(key).is_some(), "younger keys must survive");
        }
        prop_assert_eq!(cache.tail_key(), Some(unique_keys[1].clone()));
    }

    // Under LRU an access rescues an entry from eviction; the least
    // recently accessed entry goes instead.
    #[test]
    fn prop_lru_access_tracking(keys in prop::collection::vec(valid_key_strategy(), 3..8)) {
        let unique_keys: Vec<String> = keys
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        prop_assume!(unique_keys.len() >= 3);

        let capacity = unique_keys.len() - 1;
        let cache = Cache::new()
            .with_max_size(capacity)
            .with_eviction_policy(EvictionPolicy::LeastRecentlyUsed);

        // Fill to capacity with all but the last key
        for key in &unique_keys[..capacity] {
            cache.set(key.clone(), "v");
        }

        // Touch the would-be victim, making the second key the oldest
        prop_assert!(cache.get(&unique_keys[0]).is_some());

        // The final insert evicts the new oldest
        cache.set(unique_keys[capacity].clone(), "v");

        prop_assert!(cache.get(&unique_keys[0]).is_some(), "accessed key must survive");
        prop_assert!(cache.get(&unique_keys[1]).is_none(), "least recently used key must go");
        cache.assert_consistent();
    }
}
