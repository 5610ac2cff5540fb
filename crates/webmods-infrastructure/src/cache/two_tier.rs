//! Two-tier cache
//!
//! A bounded local tier in front of a shared remote KV. Writes and deletes
//! publish the affected key on the refresh channel; every peer's subscriber
//! then drops that key from its local tier. Values are JSON-encoded.
//!
//! ## Example
//!
//! ```ignore
//! use webmods_infrastructure::cache::{CacheConfig, TwoTierCache};
//!
//! let cache = TwoTierCache::new(&ctx, kv, CacheConfig::default()).await?;
//! cache.set(&ctx, "user:1", &user, Duration::from_secs(60)).await?;
//! let user: User = cache.get(&ctx, "user:1").await?;
//! ```

use crate::cache::config::{CacheConfig, CacheKey};
use crate::cache::local::LocalStore;
use crate::cache::refresh::RefreshSubscriber;
use crate::cache::stats::{CacheCounters, CacheStats};
use crate::context::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use webmods_domain::error::{Error, Result};
use webmods_domain::ports::KvClient;

struct CacheInner {
    kv: Arc<dyn KvClient>,
    local: LocalStore,
    config: CacheConfig,
    counters: Arc<CacheCounters>,
    token: CancellationToken,
    subscriber: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for CacheInner {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Local + remote cache kept coherent by pub/sub invalidation
///
/// Clones share both tiers and the subscriber. The subscriber stops when
/// the owning context is cancelled, on [`close`](Self::close), or when the
/// last clone is dropped.
#[derive(Clone)]
pub struct TwoTierCache {
    inner: Arc<CacheInner>,
}

impl TwoTierCache {
    /// Build the cache and start its refresh subscriber
    ///
    /// # Errors
    ///
    /// [`Error::Misconfigured`] for an unusable configuration; the KV error
    /// when the refresh channel cannot be subscribed.
    pub async fn new(ctx: &Context, kv: Arc<dyn KvClient>, config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let local = LocalStore::new(config.local_capacity, config.local_ttl);
        let stream = ctx.run(kv.subscribe(&config.refresh_channel)).await?;

        let counters = Arc::new(CacheCounters::default());
        let token = ctx.cancellation_token().child_token();
        let subscriber = RefreshSubscriber {
            kv: Arc::clone(&kv),
            channel: config.refresh_channel.clone(),
            local: local.clone(),
            counters: Arc::clone(&counters),
            token: token.clone(),
        };
        let handle = tokio::spawn(ctx.clone().scope(subscriber.run(stream)));

        debug!(
            channel = %config.refresh_channel,
            capacity = config.local_capacity,
            local_ttl = ?config.local_ttl,
            provider = kv.provider_name(),
            "Two-tier cache started"
        );

        Ok(Self {
            inner: Arc::new(CacheInner {
                kv,
                local,
                config,
                counters,
                token,
                subscriber: Mutex::new(Some(handle)),
            }),
        })
    }

    /// Read `key`, from the local tier if present, else from the remote KV
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when neither tier has the key; remote failures
    /// are returned as-is and never answered from stale local data. A done
    /// `ctx` fails before either tier is read.
    pub async fn get<T: DeserializeOwned>(&self, ctx: &Context, key: &str) -> Result<T> {
        self.validate(key)?;
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        if let Some(bytes) = self.inner.local.get(key).await {
            self.inner.counters.local_hit();
            return decode(&bytes);
        }

        let Some(bytes) = ctx.run(self.inner.kv.get(key)).await? else {
            self.inner.counters.miss();
            return Err(Error::not_found(key));
        };
        self.inner.counters.remote_hit();

        let value = decode(&bytes)?;
        self.inner.local.insert(key, bytes.into()).await;
        Ok(value)
    }

    /// Write `value` to both tiers and announce `key` to peers
    ///
    /// A zero `ttl` stores the remote entry without expiry.
    ///
    /// # Errors
    ///
    /// Serialization errors, the remote write failure, or the publish
    /// failure. A failed remote write leaves the local tier untouched.
    pub async fn set<T>(&self, ctx: &Context, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.validate(key)?;

        let bytes = serde_json::to_vec(value)?;
        let remote_ttl = (!ttl.is_zero()).then_some(ttl);
        ctx.run(self.inner.kv.set(key, &bytes, remote_ttl)).await?;

        self.inner.local.insert(key, bytes.into()).await;
        self.publish(ctx, key).await
    }

    /// Remove `key` from both tiers and announce it to peers
    ///
    /// Returns whether the remote KV held the key.
    pub async fn delete(&self, ctx: &Context, key: &str) -> Result<bool> {
        self.validate(key)?;

        let existed = ctx.run(self.inner.kv.del(key)).await?;
        self.inner.local.invalidate(key).await;
        self.publish(ctx, key).await?;
        Ok(existed)
    }

    /// Drop `key` from this peer's local tier only
    pub async fn evict_local(&self, key: &str) {
        self.inner.local.invalidate(key).await;
    }

    /// Whether this peer's local tier holds `key`
    pub fn contains_local(&self, key: &str) -> bool {
        self.inner.local.contains(key)
    }

    /// Activity counters and local entry count
    pub async fn stats(&self) -> CacheStats {
        let entries = self.inner.local.entry_count().await;
        self.inner.counters.snapshot(entries)
    }

    /// Configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Whether the refresh subscriber has been told to stop
    pub fn is_closed(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Stop the refresh subscriber and wait for it to finish
    pub async fn close(&self) {
        self.inner.token.cancel();
        let handle = self
            .inner
            .subscriber
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Refresh subscriber task failed");
            }
        }
    }

    fn validate(&self, key: &str) -> Result<()> {
        CacheKey::validate(key, &self.inner.config.refresh_channel)
    }

    async fn publish(&self, ctx: &Context, key: &str) -> Result<()> {
        let channel = &self.inner.config.refresh_channel;
        ctx.run(self.inner.kv.publish(channel, key))
            .await
            .map_err(|e| match e {
                Error::Transport { .. } | Error::Cancelled | Error::DeadlineExceeded => e,
                other => Error::transport_with_source(
                    format!("Failed to publish refresh event for {key}"),
                    other,
                ),
            })
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(Error::from)
}

impl std::fmt::Debug for TwoTierCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoTierCache")
            .field("config", &self.inner.config)
            .field("local", &self.inner.local)
            .field("provider", &self.inner.kv.provider_name())
            .field("closed", &self.is_closed())
            .finish()
    }
}
