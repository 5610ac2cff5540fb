//! Domain layer constants

/// Default pub/sub channel carrying cache refresh events
pub const DEFAULT_REFRESH_CHANNEL: &str = "cacheRefreshEventChannel";

/// Default root directory of the local object storage provider
pub const DEFAULT_STORAGE_BASE_PATH: &str = "./data";

/// Provider name of the local filesystem object storage
pub const STORAGE_PROVIDER_LOCAL: &str = "local";
