//! Bundle pipeline error types.
//!
//! All failures abort the whole manifest generation run; nothing is
//! retried and no partial manifest reaches disk.

use std::path::PathBuf;

use thiserror::Error;

use skiff_crypto::HashError;

/// Errors from the bundle manifest pipeline.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The requested hash algorithm is not registered.
    #[error("unsupported hash function {name:?} (available: {available})")]
    UnsupportedHashFunction {
        /// The name that failed to resolve.
        name: String,
        /// Comma-separated registered names, for the user-facing message.
        available: String,
    },

    /// The build directory does not exist or is not a directory.
    #[error("build directory not found: {path}")]
    BuildDirNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A file or directory could not be read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Digest computation failed (delegated from skiff-crypto).
    #[error(transparent)]
    Hash(#[from] HashError),

    /// Manifest serialization failed.
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl BundleError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for bundle operations.
pub type BundleResult<T> = Result<T, BundleError>;
