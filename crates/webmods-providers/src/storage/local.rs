//! Local filesystem object storage
//!
//! Objects are plain files below a base directory. Object paths are
//! relative and may not climb out of the base directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;
use webmods_domain::error::{Error, Result};
use webmods_domain::ports::{ObjectInfo, ObjectStorage};

/// Object storage rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    base_path: PathBuf,
}

impl LocalObjectStorage {
    /// Create the storage, creating `base_path` if needed
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path).map_err(|e| {
            Error::io_with_source(
                format!("Failed to create storage directory {}", base_path.display()),
                e,
            )
        })?;
        Ok(Self { base_path })
    }

    /// Root directory of this storage
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn object_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::invalid_argument(format!(
                "Object path escapes storage root: {path}"
            )));
        }
        Ok(self.base_path.join(relative))
    }

    fn relative_name(&self, full: &Path) -> String {
        full.strip_prefix(&self.base_path)
            .unwrap_or(full)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn object_info(&self, full: &Path, metadata: &std::fs::Metadata) -> ObjectInfo {
        let path = self.relative_name(full);
        let name = full
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ObjectInfo {
            path,
            name,
            size: metadata.len(),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            is_dir: metadata.is_dir(),
        }
    }
}

fn map_io(path: &str, op: &str, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::not_found(path)
    } else {
        Error::io_with_source(format!("Failed to {op} object {path}"), e)
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn save(&self, path: &str, data: &[u8]) -> Result<u64> {
        let full = self.object_path(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| map_io(path, "create parent of", e))?;
        }
        tokio::fs::write(&full, data)
            .await
            .map_err(|e| map_io(path, "write", e))?;
        debug!(path, bytes = data.len(), "Saved object");
        Ok(data.len() as u64)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let root = self.object_path(prefix)?;
        if !tokio::fs::try_exists(&root).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let storage = self.clone();
        let prefix = prefix.to_string();
        tokio::task::spawn_blocking(move || -> Result<Vec<ObjectInfo>> {
            let mut objects = Vec::new();
            for entry in WalkDir::new(&root).sort_by_file_name() {
                let entry = entry.map_err(|e| {
                    Error::io(format!("Failed to list objects under {prefix}: {e}"))
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let metadata = entry.metadata().map_err(|e| {
                    Error::io(format!("Failed to stat {}: {e}", entry.path().display()))
                })?;
                objects.push(storage.object_info(entry.path(), &metadata));
            }
            Ok(objects)
        })
        .await
        .map_err(|e| Error::internal(format!("Listing task failed: {e}")))?
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.object_path(path)?;
        tokio::fs::read(&full)
            .await
            .map_err(|e| map_io(path, "read", e))
    }

    async fn stat(&self, path: &str) -> Result<ObjectInfo> {
        let full = self.object_path(path)?;
        let metadata = tokio::fs::metadata(&full)
            .await
            .map_err(|e| map_io(path, "stat", e))?;
        Ok(self.object_info(&full, &metadata))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full = self.object_path(path)?;
        tokio::fs::remove_file(&full)
            .await
            .map_err(|e| map_io(path, "delete", e))
    }

    fn provider_name(&self) -> &str {
        "local"
    }
}
