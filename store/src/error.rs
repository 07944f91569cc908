//! Store errors
//!
//! Validation and not-found conditions are recoverable by the caller.
//! Everything else is a storage failure and is fatal to the operation in
//! progress; nothing here is retried.

use std::path::PathBuf;

/// Memory store errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or missing required input, rejected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Memory not found: {0}")]
    NotFound(String),

    /// Advanced-syntax query rejected by the FTS5 parser
    #[error("Invalid FTS5 advanced syntax: {0}")]
    SearchSyntax(String),

    #[error("SQLite error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Home directory could not be determined")]
    HomeDirUnavailable,
}

impl Error {
    /// True for conditions the caller can recover from without touching storage
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::NotFound(_))
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;
