//! Types for the encoder module.

use serde::Serialize;
use std::sync::Arc;

use crate::media::{file_stem, TargetFormat};

/// A request to encode one file.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    /// Original file name.
    pub file_name: String,
    /// Declared media type of the input.
    pub media_type: String,
    /// Full input payload.
    pub payload: Arc<[u8]>,
    /// Requested output format.
    pub target: TargetFormat,
}

impl EncodeRequest {
    /// Creates a new encode request.
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        payload: Arc<[u8]>,
        target: TargetFormat,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            payload,
            target,
        }
    }

    /// Name of the output for a re-encoded file: `<prefix><stem>.<extension>`.
    pub fn output_name(&self, prefix: &str, extension: &str) -> String {
        format!("{}{}.{}", prefix, file_stem(&self.file_name), extension)
    }
}

/// Output ready to be handed to the download sink.
#[derive(Clone, Serialize)]
pub struct EncodedOutput {
    /// File name the download is offered under.
    pub file_name: String,
    /// MIME type of the output.
    pub media_type: String,
    /// Output bytes.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl EncodedOutput {
    /// Output size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl std::fmt::Debug for EncodedOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedOutput")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}
