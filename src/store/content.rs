//! Content store rooted at the output directory

use crate::store::{ensure_contained, PathError, StoreResult};
use crate::url::matches;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A file found by [`ContentStore::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    /// Last modification time (RFC 3339), when the platform reports one
    pub modified_at: Option<String>,
}

/// Writes and lists files below a single root directory
///
/// Every path handed to the store is checked with the path guard first; only
/// the resolved path is ever opened.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Creates a store rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `contents` to `relative_path` below the root
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Resolved path of the written file
    /// * `Err(StoreError::Path)` - The path is empty or escapes the root
    /// * `Err(StoreError::Io)` - The file could not be written
    pub async fn write(&self, relative_path: &str, contents: &[u8]) -> StoreResult<PathBuf> {
        if relative_path.trim().is_empty() {
            return Err(PathError::Empty.into());
        }

        // Nothing touches the disk until the path is approved
        let target = ensure_contained(&self.root.join(relative_path), &self.root)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, contents).await?;

        tracing::info!("Saved {} bytes to {}", contents.len(), target.display());
        Ok(target)
    }

    /// Lists regular files in `dir` (relative to the root), sorted by name
    ///
    /// `pattern` is a wildcard filter on file names. A directory that does
    /// not exist yet lists as empty.
    pub async fn list(&self, dir: Option<&str>, pattern: Option<&str>) -> StoreResult<Vec<FileInfo>> {
        let dir = ensure_contained(&self.root.join(dir.unwrap_or("")), &self.root)?;

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(pattern) = pattern {
                if !matches(&name, pattern) {
                    continue;
                }
            }

            let modified_at = metadata
                .modified()
                .ok()
                .map(|time| DateTime::<Utc>::from(time).to_rfc3339());

            files.push(FileInfo {
                name,
                size: metadata.len(),
                modified_at,
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!("Listed {} files in {}", files.len(), dir.display());
        Ok(files)
    }
}
