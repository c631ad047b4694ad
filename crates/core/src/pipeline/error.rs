//! Error types for the pipeline module.

use thiserror::Error;
use uuid::Uuid;

use super::job::BatchState;

/// Errors returned by pipeline operations or recorded per item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Submission had no files, or none could be read.
    #[error("No files to convert")]
    EmptyBatch,

    /// Chosen format is empty or not offered for this batch.
    #[error("Invalid target format: {format:?}")]
    InvalidFormat { format: String },

    /// No encoder handles this file's kind.
    #[error("Unsupported file type for {file}: {media_type:?}")]
    UnsupportedKind { file: String, media_type: String },

    /// Encoder or download sink failed for one file.
    #[error("Error processing {file}: {message}")]
    ConversionFailure { file: String, message: String },

    /// Payload could not be read during ingest.
    #[error("Failed to read {file}: {reason}")]
    ReadFailure { file: String, reason: String },

    /// Operation called in the wrong batch state.
    #[error("Invalid batch state: expected {expected}, found {actual}")]
    InvalidState {
        expected: BatchState,
        actual: BatchState,
    },

    /// A newer batch was submitted while this one was running.
    #[error("Batch {job_id} was superseded by a newer submission")]
    Superseded { job_id: Uuid },
}

impl PipelineError {
    /// Creates a conversion failure error.
    pub fn conversion_failure(file: impl Into<String>, message: impl ToString) -> Self {
        Self::ConversionFailure {
            file: file.into(),
            message: message.to_string(),
        }
    }

    /// Reason text used in the failure log line.
    pub(crate) fn item_reason(&self) -> String {
        match self {
            Self::ConversionFailure { message, .. } => message.clone(),
            Self::UnsupportedKind { media_type, .. } => {
                format!("unsupported file type {:?}", media_type)
            }
            Self::ReadFailure { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}
