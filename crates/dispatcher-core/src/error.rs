//! Error types for dispatcher-core

use std::path::PathBuf;

/// Result type for dispatcher-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up or running a conversion
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tree to convert does not exist
    #[error("Configuration source not found at {path}")]
    SourceNotFound { path: PathBuf },

    /// A default fragment is missing from the template tree
    #[error("Template {name} not found under {root}")]
    TemplateNotFound { name: String, root: PathBuf },

    /// Converter settings could not be parsed
    #[error("Invalid converter configuration: {message}")]
    InvalidConfig { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from dispatcher-fs
    #[error(transparent)]
    Fs(#[from] dispatcher_fs::Error),

    /// Rewrite error from dispatcher-rewrite
    #[error(transparent)]
    Rewrite(#[from] dispatcher_rewrite::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
