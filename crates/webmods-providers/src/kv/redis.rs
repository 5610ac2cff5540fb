//! Redis KV provider
//!
//! Distributed key-value client using Redis as the backend.
//!
//! ## Features
//!
//! - Single node via an auto-reconnecting `ConnectionManager`
//! - Sharded cluster via the async cluster connection
//! - Pub/sub on a dedicated connection to the first endpoint; cluster
//!   `PUBLISH` is propagated to every node, so one subscription suffices
//!
//! ## Example
//!
//! ```ignore
//! use webmods_providers::kv::RedisKvClient;
//! use webmods_domain::value_objects::KvConfig;
//!
//! let kv = RedisKvClient::new(&KvConfig::single("localhost:6379"))?;
//! ```

use async_trait::async_trait;
use futures::StreamExt;
use redis::Client;
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use webmods_domain::error::{Error, Result};
use webmods_domain::ports::{KvClient, KvMessage, KvMessageStream};
use webmods_domain::value_objects::KvConfig;

/// Client topology chosen from the number of endpoints
#[derive(Clone)]
enum Topology {
    Single(Client),
    Cluster(ClusterClient),
}

/// Established command connection
#[derive(Clone)]
enum Connection {
    Single(ConnectionManager),
    Cluster(ClusterConnection),
}

impl Connection {
    async fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> redis::RedisResult<T> {
        match self.clone() {
            Self::Single(mut conn) => cmd.query_async(&mut conn).await,
            Self::Cluster(mut conn) => cmd.query_async(&mut conn).await,
        }
    }
}

/// Redis KV client
///
/// Cheap to share behind an `Arc`; the command connection is multiplexed
/// and opened on first use.
pub struct RedisKvClient {
    topology: Topology,
    pubsub_client: Client,
    connection: OnceCell<Connection>,
    endpoints: Vec<String>,
}

impl RedisKvClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// [`Error::Misconfigured`] for an empty endpoint list,
    /// [`Error::Transport`] when an endpoint URL is rejected by the driver.
    pub fn new(config: &KvConfig) -> Result<Self> {
        if config.urls.is_empty() {
            return Err(Error::misconfigured("No redis hosts configured"));
        }

        let urls: Vec<String> = config
            .urls
            .iter()
            .map(|addr| endpoint_url(addr, config.password.as_deref()))
            .collect();

        let pubsub_client = Client::open(urls[0].as_str()).map_err(|e| {
            Error::transport_with_source(format!("Failed to create Redis client: {e}"), e)
        })?;

        let topology = if urls.len() == 1 {
            Topology::Single(pubsub_client.clone())
        } else {
            let cluster = ClusterClient::new(urls.clone()).map_err(|e| {
                Error::transport_with_source(format!("Failed to create Redis cluster client: {e}"), e)
            })?;
            Topology::Cluster(cluster)
        };

        Ok(Self {
            topology,
            pubsub_client,
            connection: OnceCell::new(),
            endpoints: config.urls.clone(),
        })
    }

    /// Whether commands are routed through a cluster client
    pub fn is_cluster(&self) -> bool {
        matches!(self.topology, Topology::Cluster(_))
    }

    /// Configured endpoint addresses (without credentials)
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    async fn connection(&self) -> Result<&Connection> {
        self.connection
            .get_or_try_init(|| async {
                let conn = match &self.topology {
                    Topology::Single(client) => {
                        Connection::Single(client.get_connection_manager().await?)
                    }
                    Topology::Cluster(client) => {
                        Connection::Cluster(client.get_async_connection().await?)
                    }
                };
                info!(endpoints = ?self.endpoints, "Connected to Redis");
                Ok::<_, redis::RedisError>(conn)
            })
            .await
            .map_err(|e| {
                Error::transport_with_source(format!("Failed to get Redis connection: {e}"), e)
            })
    }

    async fn query<T: redis::FromRedisValue>(&self, op: &str, cmd: &redis::Cmd) -> Result<T> {
        let conn = self.connection().await?;
        conn.query(cmd)
            .await
            .map_err(|e| Error::transport_with_source(format!("Redis {op} failed: {e}"), e))
    }
}

/// Turn a configured endpoint into a connection URL
///
/// Bare `host:port` addresses get the `redis://` scheme and the shared
/// password; full URLs are used verbatim.
fn endpoint_url(addr: &str, password: Option<&str>) -> String {
    if addr.contains("://") {
        return addr.to_string();
    }
    match password.filter(|p| !p.is_empty()) {
        Some(password) => format!("redis://:{}@{}", urlencoding::encode(password), addr),
        None => format!("redis://{addr}"),
    }
}

#[async_trait]
impl KvClient for RedisKvClient {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.query("GET", redis::cmd("GET").arg(key)).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl.filter(|ttl| !ttl.is_zero()) {
            // PX keeps sub-second TTLs; round up so a 1ns TTL is not "no expiry"
            let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
            cmd.arg("PX").arg(millis);
        }
        self.query::<()>("SET", &cmd).await
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let removed: i64 = self.query("DEL", redis::cmd("DEL").arg(key)).await?;
        Ok(removed > 0)
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<()> {
        let receivers: i64 = self
            .query("PUBLISH", redis::cmd("PUBLISH").arg(channel).arg(payload))
            .await?;
        debug!(channel, "Published message to {} subscribers", receivers);
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<KvMessageStream> {
        let mut pubsub = self.pubsub_client.get_async_pubsub().await.map_err(|e| {
            Error::transport_with_source(format!("Failed to open Redis pub/sub connection: {e}"), e)
        })?;
        pubsub.subscribe(channel).await.map_err(|e| {
            Error::transport_with_source(format!("Redis SUBSCRIBE {channel} failed: {e}"), e)
        })?;
        debug!(channel, "Subscribed to Redis channel");

        let stream = pubsub.into_on_message().filter_map(|msg| async move {
            let channel = msg.get_channel_name().to_string();
            match msg.get_payload::<String>() {
                Ok(payload) => Some(KvMessage { channel, payload }),
                Err(e) => {
                    warn!(channel = %channel, error = %e, "Dropping non UTF-8 pub/sub payload");
                    None
                }
            }
        });
        Ok(Box::pin(stream))
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisKvClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKvClient")
            .field("endpoints", &self.endpoints)
            .field("cluster", &self.is_cluster())
            .field("connected", &self.connection.initialized())
            .finish()
    }
}
