//! Object storage port
//!
//! Uniform file operations over pluggable backends. Paths are relative,
//! `/`-separated object names.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata of a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object path relative to the storage root
    pub path: String,
    /// Final path segment
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time, when the backend reports one
    pub last_modified: Option<DateTime<Utc>>,
    /// Whether the path denotes a directory/prefix
    pub is_dir: bool,
}

/// Object storage port
#[async_trait]
pub trait ObjectStorage: Send + Sync + fmt::Debug {
    /// Store `data` at `path`, replacing any existing object; returns bytes written
    async fn save(&self, path: &str, data: &[u8]) -> Result<u64>;

    /// List every object below `prefix`; an absent prefix yields an empty list
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>>;

    /// Read the full contents of an object
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Metadata of an object
    async fn stat(&self, path: &str) -> Result<ObjectInfo>;

    /// Delete an object
    async fn delete(&self, path: &str) -> Result<()>;

    /// Name of the implementation (e.g. "local")
    fn provider_name(&self) -> &str;
}
