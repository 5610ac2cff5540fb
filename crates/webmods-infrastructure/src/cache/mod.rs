//! Two-tier caching
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`two_tier`] | [`TwoTierCache`]: local tier + remote KV + refresh channel |
//! | [`local`] | Moka-backed local tier |
//! | [`config`] | [`CacheConfig`] and key validation |
//!
//! Coherence is by invalidation only: the refresh channel carries keys,
//! never values, and delivery is best-effort.

pub mod config;
pub mod local;
mod refresh;
pub mod stats;
pub mod two_tier;

pub use config::{CacheConfig, CacheKey};
pub use local::LocalStore;
pub use stats::CacheStats;
pub use two_tier::TwoTierCache;
