//! Local cache tier
//!
//! Bounded in-process store in front of the remote KV. Moka's TinyLFU
//! admission decides what stays once the capacity is reached; entries also
//! expire after the configured local TTL regardless of their remote TTL.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Moka-backed local tier holding serialized values
#[derive(Clone)]
pub struct LocalStore {
    cache: Cache<String, Arc<[u8]>>,
    capacity: u64,
    ttl: Duration,
}

impl LocalStore {
    /// Create a store with `capacity` entries and a per-entry TTL
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self {
            cache,
            capacity,
            ttl,
        }
    }

    /// Serialized value for `key`
    pub async fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        self.cache.get(key).await
    }

    /// Store a serialized value
    pub async fn insert(&self, key: &str, bytes: Arc<[u8]>) {
        self.cache.insert(key.to_string(), bytes).await;
    }

    /// Drop `key`
    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Whether `key` is currently held
    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Number of live entries, after pending maintenance has run
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Per-entry time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
