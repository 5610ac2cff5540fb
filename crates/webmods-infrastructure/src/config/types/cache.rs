//! Cache configuration types

use crate::config::ConfigStore;
use crate::constants::{CACHE_DEFAULT_LOCAL_CAPACITY, CACHE_DEFAULT_LOCAL_TTL};
use std::time::Duration;
use webmods_domain::constants::DEFAULT_REFRESH_CHANNEL;
use webmods_domain::error::{Error, Result};

/// Two-tier cache configuration (`cache.*`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries in the local tier
    pub local_capacity: u64,

    /// Time-to-live of local entries, independent of the remote TTL
    pub local_ttl: Duration,

    /// Pub/sub channel carrying invalidated keys
    pub refresh_channel: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            local_capacity: CACHE_DEFAULT_LOCAL_CAPACITY,
            local_ttl: CACHE_DEFAULT_LOCAL_TTL,
            refresh_channel: DEFAULT_REFRESH_CHANNEL.to_string(),
        }
    }
}

impl CacheConfig {
    /// Read `cache.local_capacity`, `cache.local_ttl` and
    /// `cache.refresh_channel`; unset or non-positive values keep defaults
    pub fn from_store(store: &ConfigStore) -> Self {
        let defaults = Self::default();

        let local_capacity = u64::try_from(store.get_i64("cache.local_capacity"))
            .ok()
            .filter(|c| *c > 0)
            .unwrap_or(defaults.local_capacity);

        let local_ttl = Some(store.get_duration("cache.local_ttl"))
            .filter(|ttl| !ttl.is_zero())
            .unwrap_or(defaults.local_ttl);

        let refresh_channel = Some(store.get_string("cache.refresh_channel"))
            .filter(|c| !c.is_empty())
            .unwrap_or(defaults.refresh_channel);

        Self {
            local_capacity,
            local_ttl,
            refresh_channel,
        }
    }

    /// Check that the cache can be built from this configuration
    ///
    /// # Errors
    ///
    /// [`Error::Misconfigured`] for a zero capacity or an empty channel name.
    pub fn validate(&self) -> Result<()> {
        if self.local_capacity == 0 {
            return Err(Error::misconfigured("Cache local capacity must be positive"));
        }
        if self.refresh_channel.is_empty() {
            return Err(Error::misconfigured("Cache refresh channel cannot be empty"));
        }
        Ok(())
    }

    /// Set the local tier capacity
    pub fn with_local_capacity(mut self, capacity: u64) -> Self {
        self.local_capacity = capacity;
        self
    }

    /// Set the local tier time-to-live
    pub fn with_local_ttl(mut self, ttl: Duration) -> Self {
        self.local_ttl = ttl;
        self
    }

    /// Set the refresh channel name
    pub fn with_refresh_channel<S: Into<String>>(mut self, channel: S) -> Self {
        self.refresh_channel = channel.into();
        self
    }
}
