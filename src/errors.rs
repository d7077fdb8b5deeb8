use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the durable store and the repositories layered on it.
///
/// A missing record file is deliberately absent from this list: reads seed the
/// compiled-in default instead of failing.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Permission denied, disk full, path unavailable, ...
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An existing file (live record, backup, or freshly written temp file) failed to parse.
    #[error("corrupt data in {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Wrapper around serialization of an in-memory record.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Record or backup name rejected before a path was built from it.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Feed effect payload rejected at the boundary.
    #[error("invalid effect: {0}")]
    InvalidEffect(String),

    /// A persisted record holds values the simulation rules cannot operate on.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Restore requested for a snapshot that does not exist.
    #[error("backup not found: {0}")]
    BackupNotFound(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Corrupt {
            path: path.into(),
            source,
        }
    }

    /// True for failures caused by unreadable content rather than the filesystem.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
