//! In-memory KV provider
//!
//! In-process key-value store with pub/sub over a tokio broadcast channel.
//!
//! ## Features
//!
//! - Clones share one store and one broadcast channel
//! - Per-key TTL, checked on read
//! - Availability switch to exercise transport-failure paths
//!
//! ## Example
//!
//! ```ignore
//! use webmods_providers::kv::InMemoryKvClient;
//!
//! let kv = InMemoryKvClient::new();
//! let peer = kv.clone(); // same store, same channels
//! ```

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, warn};
use webmods_domain::error::{Error, Result};
use webmods_domain::ports::{KvClient, KvMessage, KvMessageStream};

/// Default broadcast channel capacity
const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
struct StoredValue {
    bytes: Vec<u8>,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// KV client backed by process memory
///
/// When the broadcast buffer is full, the oldest messages are dropped for
/// slow subscribers, matching the at-most-once delivery of a real pub/sub.
#[derive(Clone)]
pub struct InMemoryKvClient {
    entries: Arc<DashMap<String, StoredValue>>,
    sender: Arc<broadcast::Sender<KvMessage>>,
    available: Arc<AtomicBool>,
}

impl InMemoryKvClient {
    /// Create a new store with the default channel capacity (1024)
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create with a custom pub/sub buffer capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            entries: Arc::new(DashMap::new()),
            sender: Arc::new(sender),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate the server becoming unreachable (or reachable again)
    ///
    /// While unavailable every operation fails with a transport error.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of live subscriptions across all clones
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Number of stored keys, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_available(&self, op: &str) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::transport(format!("In-memory KV {op} failed: unavailable")))
        }
    }
}

impl Default for InMemoryKvClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryKvClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKvClient")
            .field("entries", &self.entries.len())
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

#[async_trait]
impl KvClient for InMemoryKvClient {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.ensure_available("GET")?;
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.bytes.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, value| value.is_expired());
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        self.ensure_available("SET")?;
        let expires_at = ttl
            .filter(|ttl| !ttl.is_zero())
            .map(|ttl| Instant::now() + ttl);
        self.entries.insert(
            key.to_string(),
            StoredValue {
                bytes: value.to_vec(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool> {
        self.ensure_available("DEL")?;
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, value)| !value.is_expired()))
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<()> {
        self.ensure_available("PUBLISH")?;
        match self.sender.send(KvMessage::new(channel, payload)) {
            Ok(count) => debug!(channel, "Published message to {} subscribers", count),
            Err(_) => debug!(channel, "Published message but no subscribers"),
        }
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<KvMessageStream> {
        self.ensure_available("SUBSCRIBE")?;
        let receiver = self.sender.subscribe();
        let channel = channel.to_string();

        // Convert broadcast receiver to a Stream that handles lagged errors
        let stream = stream::unfold((receiver, channel), |(mut rx, channel)| async move {
            loop {
                match rx.recv().await {
                    Ok(msg) if msg.channel == channel => return Some((msg, (rx, channel))),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(channel = %channel, "Subscription lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(Box::pin(stream))
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}
