//! KV Client Implementations
//!
//! ## Available Providers
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`InMemoryKvClient`] | Local | In-process store with broadcast pub/sub |
//! | [`RedisKvClient`] | Distributed | Redis single node or cluster |
//!
//! ## Provider Selection Guide
//!
//! - **Development/Testing**: Use `InMemoryKvClient`; clones share state, so
//!   several caches built on clones behave like peers on one server
//! - **Deployments**: Use [`new_kv_client`] with the configured endpoints

pub mod memory;
#[cfg(feature = "kv-redis")]
pub mod redis;

pub use memory::InMemoryKvClient;
#[cfg(feature = "kv-redis")]
pub use self::redis::RedisKvClient;

use std::sync::Arc;
use webmods_domain::error::{Error, Result};
use webmods_domain::ports::KvClient;
use webmods_domain::value_objects::KvConfig;

/// Create a KV client from configuration
///
/// One endpoint yields a single-node client, more yield a cluster client.
/// Connections are opened lazily on first use.
///
/// # Errors
///
/// Returns [`Error::Misconfigured`] when no endpoint is configured.
pub fn new_kv_client(config: &KvConfig) -> Result<Arc<dyn KvClient>> {
    if config.urls.is_empty() {
        return Err(Error::misconfigured("No redis hosts configured"));
    }
    new_redis_client(config)
}

#[cfg(feature = "kv-redis")]
fn new_redis_client(config: &KvConfig) -> Result<Arc<dyn KvClient>> {
    Ok(Arc::new(RedisKvClient::new(config)?))
}

#[cfg(not(feature = "kv-redis"))]
fn new_redis_client(_config: &KvConfig) -> Result<Arc<dyn KvClient>> {
    Err(Error::misconfigured(
        "Redis support is disabled (enable the `kv-redis` feature)",
    ))
}
