//! Error types for fwsync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from fwsync-core
    #[error(transparent)]
    Core(#[from] fwsync_core::Error),

    /// JSON output could not be rendered
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Logging could not be set up
    #[error("failed to initialize logging: {0}")]
    Logging(String),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}

impl From<fwsync_core::TransportError> for CliError {
    fn from(e: fwsync_core::TransportError) -> Self {
        Self::Core(e.into())
    }
}
