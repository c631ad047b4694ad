//! Error types for the source module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a source file.
#[derive(Debug, Error)]
pub enum SourceError {
    /// File does not exist at its path.
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    /// Read was refused or aborted by the source.
    #[error("{reason}")]
    ReadFailed { name: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Creates a read failed error.
    pub fn read_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Maps an open error, turning `NotFound` into its own variant.
    pub fn from_open(path: PathBuf, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io(error)
        }
    }
}
