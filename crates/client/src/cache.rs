use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::storage::KeyValueStore;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    value: T,
    /// Milliseconds since the Unix epoch.
    timestamp: i64,
}

/// `(value, timestamp)` entries with a fixed freshness window, kept in the
/// session-scoped store.
pub struct SessionCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value if present and younger than the TTL. Corrupt
    /// entries are removed.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "dropping corrupt cache entry");
                self.store.remove(key);
                return None;
            }
        };
        let age_ms = self.clock.now().timestamp_millis() - entry.timestamp;
        if (0..self.ttl.as_millis() as i64).contains(&age_ms) {
            tracing::debug!(key, age_ms, "cache hit");
            Some(entry.value)
        } else {
            tracing::debug!(key, age_ms, "cache entry stale");
            None
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        let entry = CacheEntry {
            value,
            timestamp: self.clock.now().timestamp_millis(),
        };
        match serde_json::to_string(&entry) {
            Ok(json) => self.store.set(key, &json),
            Err(e) => tracing::warn!(key, error = %e, "failed to write cache entry"),
        }
    }

    pub fn invalidate(&self, key: &str) {
        self.store.remove(key);
    }
}
