//! Error types raised inside the file-backed store. They are logged and
//! swallowed before reaching callers of [`crate::dao::state_store::StateStore`].

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenient result alias returning [`FileStoreError`] failures.
pub type FileStoreResult<T> = Result<T, FileStoreError>;

/// Failures that can occur while reading or writing the snapshot file.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// Filesystem operation failed (permissions, disk full, ...).
    #[error("i/o failure on `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The snapshot could not be serialised.
    #[error("failed to encode snapshot")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    /// File content is not a valid snapshot document.
    #[error("failed to decode snapshot `{path}`")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The document carries a schema version this build refuses to read.
    #[error("unsupported schema version {found} in `{path}`")]
    UnsupportedSchema { path: PathBuf, found: u32 },
}

impl FileStoreError {
    /// Attach the offending path to an I/O error.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        FileStoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
