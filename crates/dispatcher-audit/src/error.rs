//! Error types for dispatcher-audit

use std::path::PathBuf;

/// Result type for dispatcher-audit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while persisting the audit trail
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
