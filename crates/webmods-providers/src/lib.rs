//! # webmods provider implementations
//!
//! Adapters implementing the ports defined in `webmods-domain`.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | KV | `KvClient` | Redis (single node / cluster), InMemory |
//! | Object storage | `ObjectStorage` | Local filesystem |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! webmods-providers = { version = "0.1", default-features = false, features = ["storage-local"] }
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use webmods_providers::kv::new_kv_client;
//! use webmods_domain::value_objects::KvConfig;
//!
//! let kv = new_kv_client(&KvConfig::single("localhost:6379"))?;
//! ```

// Re-export webmods-domain types commonly used with providers
pub use webmods_domain::error::{Error, Result};
pub use webmods_domain::ports::{KvClient, ObjectStorage};

/// Key-value client implementations
///
/// Implements `KvClient` for Redis and an in-process store.
pub mod kv;

/// Object storage implementations
///
/// Implements `ObjectStorage` for the local filesystem.
pub mod storage;
