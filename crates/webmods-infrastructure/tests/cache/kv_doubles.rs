//! KV clients with injected faults

use async_trait::async_trait;
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use webmods_domain::error::{Error, Result};
use webmods_domain::ports::{KvClient, KvMessageStream};
use webmods_providers::kv::InMemoryKvClient;

/// Delegates everything except `publish`, which always fails
#[derive(Debug, Default)]
pub struct FailingPublishKv {
    pub inner: InMemoryKvClient,
}

#[async_trait]
impl KvClient for FailingPublishKv {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn del(&self, key: &str) -> Result<bool> {
        self.inner.del(key).await
    }

    async fn publish(&self, _channel: &str, _payload: &str) -> Result<()> {
        Err(Error::internal("publish rejected"))
    }

    async fn subscribe(&self, channel: &str) -> Result<KvMessageStream> {
        self.inner.subscribe(channel).await
    }

    fn provider_name(&self) -> &str {
        "failing-publish"
    }
}

/// First subscription ends immediately; later ones delegate
#[derive(Debug, Default)]
pub struct DroppingSubscribeKv {
    pub inner: InMemoryKvClient,
    pub subscribes: AtomicUsize,
}

#[async_trait]
impl KvClient for DroppingSubscribeKv {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn del(&self, key: &str) -> Result<bool> {
        self.inner.del(key).await
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<()> {
        self.inner.publish(channel, payload).await
    }

    async fn subscribe(&self, channel: &str) -> Result<KvMessageStream> {
        if self.subscribes.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(Box::pin(stream::empty()));
        }
        self.inner.subscribe(channel).await
    }

    fn provider_name(&self) -> &str {
        "dropping-subscribe"
    }
}
