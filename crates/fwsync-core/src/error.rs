//! Error types for fwsync-core

use std::path::PathBuf;

use crate::TransportError;

/// Result type for fwsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fwsync-core operations
///
/// Path safety violations never show up here: they are recovered per entry
/// and only counted.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration value out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Manifest or file download failed after all retries
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Installing a downloaded file failed
    #[error("Failed to install {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: fwsync_fs::Error,
    },

    /// Reading the local copy of a file for comparison failed
    #[error("Failed to read local file {path}: {source}")]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The local manifest could not be used for maintenance
    #[error("Manifest at {path} is invalid: {message}")]
    ManifestInvalid { path: PathBuf, message: String },

    /// Filesystem error from fwsync-fs
    #[error(transparent)]
    Fs(#[from] fwsync_fs::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
