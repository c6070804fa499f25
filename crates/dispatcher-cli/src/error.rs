//! Error types for dispatcher-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end a conversion run
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] dispatcher_core::Error),

    #[error(transparent)]
    Fs(#[from] dispatcher_fs::Error),

    #[error(transparent)]
    Audit(#[from] dispatcher_audit::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The log subscriber could not be installed
    #[error("Failed to set up logging: {message}")]
    Logging { message: String },

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

    pub fn logging(err: impl std::fmt::Display) -> Self {
        Self::Logging {
            message: err.to_string(),
        }
    }
}
