//! Error types for the sink module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while delivering an output.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Output name has no usable file name component.
    #[error("Invalid output name: {name:?}")]
    InvalidName { name: String },

    /// Failed to create the download directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the output.
    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delivery was rejected by the sink.
    #[error("Download rejected: {reason}")]
    Rejected { reason: String },
}

impl SinkError {
    /// Creates a rejected error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}
