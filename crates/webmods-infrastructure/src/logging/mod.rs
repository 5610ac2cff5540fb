//! Structured logging with tracing
//!
//! Application code logs with the ordinary `tracing` macros. A
//! [`ContextLayer`] turns each event into a [`LogRecord`] and passes it,
//! together with the current request [`Context`](crate::context::Context),
//! to a [`LogHandler`] that appends process and request attributes and
//! writes one line in the configured [`LogFormat`].

pub mod format;
pub mod handler;
pub mod layer;
pub mod record;

pub use crate::config::LoggingConfig;
pub use format::LogFormat;
pub use handler::{LogHandler, ProcessFields};
pub use layer::ContextLayer;
pub use record::LogRecord;

use tracing::{Level, Subscriber, debug, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{Registry, layer::SubscriberExt, util::SubscriberInitExt};
use webmods_domain::error::{Error, Result};

/// Initialize the global subscriber
///
/// The level is read once; an unknown level falls back to `info`.
///
/// # Errors
///
/// [`Error::Configuration`] when a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig, process: ProcessFields) -> Result<()> {
    let (level, invalid) = match parse_log_level(&config.level) {
        Ok(level) => (level, false),
        Err(_) => (Level::INFO, true),
    };

    subscriber(LogHandler::new(config.format, level, process))
        .try_init()
        .map_err(|e| Error::configuration(format!("Logging already initialized: {e}")))?;

    if invalid {
        warn!(level = %config.level, "Unknown log level, using info");
    }
    debug!(format = config.format.name(), %level, "Logging initialized");
    Ok(())
}

/// Subscriber that sends every event at or above the handler's level to it
pub fn subscriber<W>(handler: LogHandler<W>) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = LevelFilter::from_level(handler.level());
    Registry::default()
        .with(filter)
        .with(ContextLayer::new(handler))
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}
