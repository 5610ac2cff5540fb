//! Object Storage Implementations
//!
//! | Provider | Description |
//! |----------|-------------|
//! | [`LocalObjectStorage`] | Files below a base directory |

#[cfg(feature = "storage-local")]
pub mod local;

#[cfg(feature = "storage-local")]
pub use local::LocalObjectStorage;

use std::sync::Arc;
use webmods_domain::constants::STORAGE_PROVIDER_LOCAL;
use webmods_domain::error::{Error, Result};
use webmods_domain::ports::ObjectStorage;
use webmods_domain::value_objects::StorageConfig;

/// Create an object storage backend from configuration
///
/// # Errors
///
/// [`Error::Misconfigured`] for an unknown or disabled provider; I/O errors
/// when the local base directory cannot be created.
pub fn new_object_storage(config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>> {
    match config.provider.as_str() {
        #[cfg(feature = "storage-local")]
        STORAGE_PROVIDER_LOCAL => Ok(Arc::new(LocalObjectStorage::new(&config.base_path)?)),
        other => Err(Error::misconfigured(format!(
            "Unsupported object storage provider: {other}"
        ))),
    }
}
