//! Cache Store Module
//!
//! Main cache engine: HashMap storage with TTL expiration, namespace
//! invalidation and statistics.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, Clock, KeyInfo, Namespace, SystemClock};

// == Cache Store ==
/// In-memory key/value store for JSON payloads.
///
/// Expired entries are never returned: `get` re-checks the TTL on every
/// read and drops stale entries on the spot. `cleanup_expired` only
/// reclaims memory for entries nobody asked for again.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Default TTL in seconds for entries without explicit TTL
    default_ttl: u64,
    /// Time source for expiry checks
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store using the wall clock.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL in seconds applied when `set` gets `None`
    pub fn new(default_ttl: u64) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Creates an empty store reading time from `clock`.
    pub fn with_clock(default_ttl: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
            clock,
        }
    }

    // == Set ==
    /// Stores an untagged value, overwriting any previous entry for `key`.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The payload to store
    /// * `ttl` - Optional TTL in seconds (uses default_ttl if None)
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Option<u64>) {
        self.insert(key.into(), value, ttl, None);
    }

    /// Stores a value tagged with `namespace`.
    pub fn set_in(
        &mut self,
        namespace: Namespace,
        key: impl Into<String>,
        value: Value,
        ttl: Option<u64>,
    ) {
        self.insert(key.into(), value, ttl, Some(namespace));
    }

    fn insert(&mut self, key: String, value: Value, ttl: Option<u64>, namespace: Option<Namespace>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl, namespace);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a copy of the value stored under `key`.
    ///
    /// Returns `None` when the key is absent or its TTL has elapsed; in the
    /// latter case the entry is removed.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.clock.now_ms();

        match self.entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                self.entries.remove(key);
                self.stats.record_expired(1);
                self.stats.set_total_entries(self.entries.len());
                self.stats.record_miss();
                None
            }
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes `key`, returning how many entries were removed (0 or 1).
    pub fn del(&mut self, key: &str) -> usize {
        let removed = usize::from(self.entries.remove(key).is_some());
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Flush ==
    /// Removes every entry. Returns the number removed.
    pub fn flush(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.stats.set_total_entries(0);
        removed
    }

    // == Clear By Prefix ==
    /// Removes every entry whose key starts with `prefix`.
    pub fn clear_by_prefix(&mut self, prefix: &str) -> usize {
        self.remove_where(|key, _| key.starts_with(prefix))
    }

    // == Invalidate ==
    /// Removes every entry stored under `namespace`.
    ///
    /// Untagged entries are left alone even if their key happens to share
    /// the namespace prefix.
    pub fn invalidate(&mut self, namespace: Namespace) -> usize {
        self.remove_where(|_, entry| entry.belongs_to(namespace))
    }

    fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&str, &CacheEntry) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|key, entry| !predicate(key, entry));
        let removed = before - self.entries.len();

        self.stats.record_invalidated(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - self.entries.len();

        self.stats.record_expired(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Live entries ordered by key. Expired entries awaiting the sweep are
    /// skipped.
    pub fn keys(&self) -> Vec<KeyInfo> {
        let now = self.clock.now_ms();
        let mut keys: Vec<KeyInfo> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, entry)| entry.describe(key, now))
            .collect();
        keys.sort_by(|a, b| a.key.cmp(&b.key));
        keys
    }

    /// Number of stored entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
