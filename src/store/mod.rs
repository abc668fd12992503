//! Sandboxed output storage for page-trawl
//!
//! This module provides:
//! - The path guard that keeps every write inside the output root
//! - A content store for saving artifacts and listing saved files

mod content;
mod guard;

pub use content::{ContentStore, FileInfo};
pub use guard::{ensure_contained, is_contained, resolve_path};

use thiserror::Error;

/// Path containment errors
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Path {path} is outside of {root}")]
    Escapes { path: String, root: String },

    #[error("Failed to resolve path {path}: {source}")]
    Resolve {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path is empty")]
    Empty,
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
