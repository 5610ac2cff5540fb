//! Application bootstrap
//!
//! Loads the layered configuration for a command, installs logging and
//! builds the KV, cache and storage handles from the loaded sections.

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use webmods_domain::error::Result;
use webmods_domain::ports::{KvClient, ObjectStorage};
use webmods_infrastructure::cache::{CacheConfig, TwoTierCache};
use webmods_infrastructure::config::{
    ConfigLoader, ConfigStore, LoggingConfig, kv_config_from_store, storage_config_from_store,
};
use webmods_infrastructure::constants::DEFAULT_CONFIG_DIR;
use webmods_infrastructure::context::Context;
use webmods_infrastructure::logging::{ProcessFields, init_logging};
use webmods_providers::kv::new_kv_client;
use webmods_providers::storage::new_object_storage;

/// Initialized application: configuration plus installed logging
#[derive(Debug, Clone)]
pub struct App {
    config: ConfigStore,
}

impl App {
    /// Initialize `cmd` from `./configs`
    pub fn init(cmd: &str) -> Result<Self> {
        Self::init_with_config_path(cmd, DEFAULT_CONFIG_DIR)
    }

    /// Initialize `cmd` from `config_dir`
    ///
    /// Mode comes from `$MODE`. An already-installed global subscriber is
    /// kept.
    ///
    /// # Errors
    ///
    /// Configuration files that cannot be parsed.
    pub fn init_with_config_path<P: AsRef<Path>>(cmd: &str, config_dir: P) -> Result<Self> {
        let config = ConfigLoader::new(cmd).with_config_dir(config_dir).load()?;

        let logging = LoggingConfig::from_store(&config);
        if let Err(e) = init_logging(&logging, ProcessFields::detect(cmd)) {
            warn!(error = %e, "Keeping existing logger");
        }

        info!(mode = config.mode(), "app initialized");
        Ok(Self { config })
    }

    /// Loaded configuration
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Command name
    pub fn cmd(&self) -> &str {
        self.config.cmd()
    }

    /// Mode the configuration was loaded for
    pub fn mode(&self) -> &str {
        self.config.mode()
    }

    /// KV client for the `redis` section
    pub fn kv_client(&self) -> Result<Arc<dyn KvClient>> {
        new_kv_client(&kv_config_from_store(&self.config))
    }

    /// Two-tier cache over `kv`, configured by the `cache` section
    pub async fn cache(&self, ctx: &Context, kv: Arc<dyn KvClient>) -> Result<TwoTierCache> {
        TwoTierCache::new(ctx, kv, CacheConfig::from_store(&self.config)).await
    }

    /// Object storage for the `object_storage` section
    pub fn object_storage(&self) -> Result<Arc<dyn ObjectStorage>> {
        new_object_storage(&storage_config_from_store(&self.config))
    }
}
