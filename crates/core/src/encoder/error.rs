//! Error types for the encoder module.

use thiserror::Error;

/// Errors that can occur while encoding a single file.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// The encoder cannot produce the requested target format.
    #[error("{encoder} encoder cannot produce '{format}'")]
    UnsupportedTarget { encoder: String, format: String },

    /// The input payload could not be decoded.
    #[error("Failed to decode input: {reason}")]
    DecodeFailed { reason: String },

    /// The output could not be encoded.
    #[error("Failed to encode output: {reason}")]
    EncodeFailed { reason: String },

    /// The blocking encode task panicked or was aborted.
    #[error("Encoder task failed: {reason}")]
    TaskFailed { reason: String },

    /// I/O error during encoding.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncoderError {
    /// Creates a new unsupported target error.
    pub fn unsupported_target(encoder: impl Into<String>, format: impl Into<String>) -> Self {
        Self::UnsupportedTarget {
            encoder: encoder.into(),
            format: format.into(),
        }
    }

    /// Creates a new decode failed error.
    pub fn decode_failed(reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new encode failed error.
    pub fn encode_failed(reason: impl Into<String>) -> Self {
        Self::EncodeFailed {
            reason: reason.into(),
        }
    }
}

impl From<tokio::task::JoinError> for EncoderError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed {
            reason: err.to_string(),
        }
    }
}
