//! Typed views over configuration sections

pub mod cache;
pub mod kv;
pub mod logging;
pub mod storage;

pub use cache::CacheConfig;
pub use kv::kv_config_from_store;
pub use logging::LoggingConfig;
pub use storage::storage_config_from_store;
