//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::Serialize;
use serde_json::Value;

use crate::cache::Namespace;

/// Summary of one live entry, as listed by `GET /cache/keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyInfo {
    pub key: String,
    pub namespace: Option<Namespace>,
    /// Milliseconds since the entry was stored
    pub age_ms: u64,
    pub ttl_remaining_ms: u64,
}

// == Cache Entry ==
/// A cached JSON payload with its expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: i64,
    /// Namespace the entry was stored under, if any
    pub namespace: Option<Namespace>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl_seconds` after `now_ms`.
    pub fn new(value: Value, now_ms: i64, ttl_seconds: u64, namespace: Option<Namespace>) -> Self {
        let ttl_ms = i64::try_from(ttl_seconds.saturating_mul(1000)).unwrap_or(i64::MAX);

        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
            namespace,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is expired once the current time reaches its expiration
    /// time, so a zero TTL produces an entry that is never observable.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: i64) -> u64 {
        u64::try_from(self.expires_at - now_ms).unwrap_or(0)
    }

    /// Describes the entry stored under `key` as seen at `now_ms`.
    pub fn describe(&self, key: &str, now_ms: i64) -> KeyInfo {
        KeyInfo {
            key: key.to_string(),
            namespace: self.namespace,
            age_ms: u64::try_from(now_ms - self.created_at).unwrap_or(0),
            ttl_remaining_ms: self.ttl_remaining_ms(now_ms),
        }
    }

    /// Whether the entry was stored under `namespace`.
    pub fn belongs_to(&self, namespace: Namespace) -> bool {
        self.namespace == Some(namespace)
    }
}
