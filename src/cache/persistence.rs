//! Snapshot Persistence Module
//!
//! Point-in-time binary snapshots of the entry table. Only the entries are
//! written; list linkage, endpoints, the memory counter and statistics are
//! not. On load the recency list is reconstructed by sorting entries on
//! their timestamp, then the configured bounds are enforced by evicting
//! from the rebuilt tail.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use bincode::Options;
use tracing::debug;

use crate::cache::{Cache, CacheEntry, NO_MAX_MEMORY_USAGE, NO_MAX_SIZE};
use crate::error::Result;

impl Cache {
    // == Save To File ==
    /// Writes the entry table to a snapshot file.
    ///
    /// The file is created fresh (truncating any previous snapshot) and
    /// encoded as a self-describing binary map of key to entry. The shared
    /// lock is held while encoding, so concurrent reads proceed but writes
    /// wait. There is no fsync or atomic-rename step: a snapshot is a
    /// point-in-time convenience, not a durability guarantee.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);

        let guard = self.inner.read();
        let entries: HashMap<&String, &CacheEntry> = guard
            .index
            .iter()
            .map(|(key, &idx)| (key, guard.list.entry(idx)))
            .collect();
        bincode::serialize_into(&mut writer, &entries)?;
        let written = entries.len();
        drop(guard);

        writer.flush()?;
        debug!(entries = written, path = %path.as_ref().display(), "saved snapshot");
        Ok(())
    }

    // == Read From File ==
    /// Replaces the cache contents with a snapshot written by
    /// [`save_to_file`](Cache::save_to_file).
    ///
    /// Because links are not serialized, the recency list is rebuilt from
    /// the entries' timestamps, oldest at the tail. Entries with identical
    /// timestamps keep a stable but unspecified relative order; writers
    /// that care should space their writes apart. If the snapshot holds
    /// more than the configured bounds allow, the overflow is evicted
    /// oldest-first and counted in the returned total (and in the
    /// evicted-keys statistic).
    ///
    /// The exclusive lock is held for the whole decode and rebuild. The
    /// snapshot file itself is never modified, so a load that failed on a
    /// too-small cache can be retried after reconfiguring.
    pub fn read_from_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let file = File::open(path.as_ref())?;
        let file_len = file.metadata()?.len();
        let reader = BufReader::new(file);

        let mut guard = self.inner.write();
        let inner = &mut *guard;

        // Bound allocations to the file's own size so a corrupted length
        // prefix can't trigger a huge (or aborting) allocation attempt.
        // Matches the (fixint, trailing-allowed) wire format that
        // `bincode::serialize_into` / `deserialize_from` use by default.
        let entries: HashMap<String, CacheEntry> = bincode::options()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .with_limit(file_len)
            .deserialize_from(reader)?;
        let loaded = entries.len();

        inner.index.clear();
        inner.list.clear();
        inner.memory_usage = 0;

        // Relink oldest to newest: the first entry becomes tail and head,
        // every later one becomes the new head.
        let mut ordered: Vec<CacheEntry> = entries.into_values().collect();
        ordered.sort_by_key(|entry| entry.relevant_timestamp);
        for entry in ordered {
            let key = entry.key.clone();
            let size = entry.size_in_bytes();
            let idx = inner.list.alloc(entry);
            inner.list.push_head(idx);
            inner.index.insert(key, idx);
            if self.max_memory != NO_MAX_MEMORY_USAGE {
                inner.memory_usage += size;
            }
        }

        if self.max_size == NO_MAX_SIZE && self.max_memory == NO_MAX_MEMORY_USAGE {
            debug!(entries = loaded, "loaded snapshot");
            return Ok(0);
        }

        let mut evictions = 0;
        if self.max_size != NO_MAX_SIZE {
            while inner.index.len() > self.max_size {
                self.evict_locked(inner);
                evictions += 1;
            }
        }
        if self.max_memory != NO_MAX_MEMORY_USAGE {
            while inner.memory_usage > self.max_memory && !inner.index.is_empty() {
                self.evict_locked(inner);
                evictions += 1;
            }
        }

        debug!(entries = loaded, evictions, "loaded snapshot");
        Ok(evictions)
    }
}
