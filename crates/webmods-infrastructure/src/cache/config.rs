//! Cache configuration and key utilities

pub use crate::config::CacheConfig;

use webmods_domain::error::{Error, Result};

/// Cache key utilities
pub struct CacheKey;

impl CacheKey {
    /// Validate a key for a cache publishing on `refresh_channel`
    ///
    /// A key equal to the channel name would be read as the liveness
    /// marker by every subscriber and never invalidated.
    pub fn validate(key: &str, refresh_channel: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::invalid_argument("Cache key cannot be empty"));
        }
        if key == refresh_channel {
            return Err(Error::invalid_argument(format!(
                "Cache key cannot equal the refresh channel name: {key}"
            )));
        }
        Ok(())
    }
}
