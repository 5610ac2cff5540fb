//! Key-value client port
//!
//! The shared KV backs both the remote cache tier and the pub/sub channel
//! used for cache refresh events.
//!
//! ## Example
//!
//! ```ignore
//! use webmods_domain::ports::KvClient;
//!
//! kv.set("user:123", b"{\"name\":\"alice\"}", Some(Duration::from_secs(60))).await?;
//! let bytes = kv.get("user:123").await?;
//! kv.publish("cacheRefreshEventChannel", "user:123").await?;
//! ```

use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

/// A message received on a pub/sub channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvMessage {
    /// Channel the message was published on
    pub channel: String,
    /// UTF-8 payload
    pub payload: String,
}

impl KvMessage {
    /// Create a message
    pub fn new<C: Into<String>, P: Into<String>>(channel: C, payload: P) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

/// Stream of messages delivered to one subscription
///
/// The stream ends when the underlying connection is lost; callers that
/// need a durable subscription re-subscribe.
pub type KvMessageStream = Pin<Box<dyn Stream<Item = KvMessage> + Send>>;

/// Key-value client port
///
/// Implementations must be safe for concurrent use from any number of tasks.
#[async_trait]
pub trait KvClient: Send + Sync + fmt::Debug {
    /// Read a value; `None` when the key is absent or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value; `None` (or a zero duration) stores without expiry
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Delete a key; returns whether it existed
    async fn del(&self, key: &str) -> Result<bool>;

    /// Publish a payload on a channel without waiting for subscribers
    async fn publish(&self, channel: &str, payload: &str) -> Result<()>;

    /// Subscribe to a channel
    ///
    /// Returns once the subscription is established.
    async fn subscribe(&self, channel: &str) -> Result<KvMessageStream>;

    /// Name of the implementation (e.g. "redis", "memory")
    fn provider_name(&self) -> &str;
}
