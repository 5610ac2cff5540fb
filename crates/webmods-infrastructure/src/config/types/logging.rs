//! Logging configuration types

use crate::config::ConfigStore;
use crate::constants::DEFAULT_LOG_LEVEL;
use crate::logging::LogFormat;
use serde::{Deserialize, Serialize};

/// Logging configuration (`log.*`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Read `log.level` and `log.format`
    ///
    /// An unset level means `info`; an unknown format means the pretty
    /// console output.
    pub fn from_store(store: &ConfigStore) -> Self {
        let level = store.get_string("log.level");
        Self {
            level: if level.trim().is_empty() {
                DEFAULT_LOG_LEVEL.to_string()
            } else {
                level
            },
            format: LogFormat::from_name(&store.get_string("log.format")),
        }
    }
}
