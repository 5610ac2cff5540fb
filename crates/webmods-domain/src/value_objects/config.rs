//! Provider configuration values
//!
//! Plain data handed to provider factories. Loading these from the layered
//! configuration store is the infrastructure crate's job.

use crate::constants::{DEFAULT_STORAGE_BASE_PATH, STORAGE_PROVIDER_LOCAL};
use serde::{Deserialize, Serialize};

/// Key-value endpoint configuration
///
/// One endpoint yields a single-node client; more yield a cluster client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvConfig {
    /// Endpoint addresses, either `host:port` or `redis://` URLs
    #[serde(default)]
    pub urls: Vec<String>,

    /// Shared credential for every endpoint
    #[serde(default)]
    pub password: Option<String>,
}

impl KvConfig {
    /// Configuration for a single endpoint without credentials
    pub fn single<S: Into<String>>(url: S) -> Self {
        Self {
            urls: vec![url.into()],
            password: None,
        }
    }

    /// Set the shared credential
    pub fn with_password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Whether more than one endpoint is configured
    pub fn is_cluster(&self) -> bool {
        self.urls.len() > 1
    }
}

/// Object storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Provider name (`local`)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Root directory for the local provider
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

fn default_provider() -> String {
    STORAGE_PROVIDER_LOCAL.to_string()
}

fn default_base_path() -> String {
    DEFAULT_STORAGE_BASE_PATH.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_path: default_base_path(),
        }
    }
}

impl StorageConfig {
    /// Local storage rooted at `base_path`
    pub fn local<S: Into<String>>(base_path: S) -> Self {
        Self {
            provider: default_provider(),
            base_path: base_path.into(),
        }
    }
}
