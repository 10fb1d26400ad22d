//! Hashing error types.
//!
//! Structured errors for checksum and CID computation. Every error carries
//! the offending path so CLI output can point at the exact file.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from checksum and CID computation.
#[derive(Debug, Error)]
pub enum HashError {
    /// A file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for hashing operations.
pub type HashResult<T> = Result<T, HashError>;
