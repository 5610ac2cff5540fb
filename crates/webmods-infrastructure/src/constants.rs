//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Domain-specific constants are defined in `webmods_domain::constants`.

use std::time::Duration;

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration directory, relative to the working directory
pub const DEFAULT_CONFIG_DIR: &str = "configs";

/// File stem of a base configuration layer
pub const CONFIG_BASE_NAME: &str = "default";

/// Configuration file extensions, probed in order
pub const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "toml"];

/// Environment variable selecting the configuration overlay
pub const MODE_ENV_VAR: &str = "MODE";

/// Mode used when `MODE` is unset or empty
pub const DEFAULT_MODE: &str = "development";

/// Separator between path segments in environment variable names
pub const ENV_PATH_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Process field carrying the command name
pub const LOG_FIELD_CMD: &str = "cmd";

/// Process field carrying the host name
pub const LOG_FIELD_HOSTNAME: &str = "hostname";

// ============================================================================
// GRPC CONSTANTS
// ============================================================================

/// Metadata header carrying the correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Log attribute carrying the correlation id
pub const REQUEST_ID_ATTR: &str = "request_id";

// ============================================================================
// CACHE CONSTANTS
// ============================================================================

/// Default local tier capacity (entries)
pub const CACHE_DEFAULT_LOCAL_CAPACITY: u64 = 1000;

/// Default local tier time-to-live
pub const CACHE_DEFAULT_LOCAL_TTL: Duration = Duration::from_secs(60);

/// First delay before re-subscribing to the refresh channel
pub const CACHE_RESUBSCRIBE_INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Upper bound of the re-subscribe delay
pub const CACHE_RESUBSCRIBE_MAX_BACKOFF: Duration = Duration::from_secs(5);
