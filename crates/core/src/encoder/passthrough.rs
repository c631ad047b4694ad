//! Pass-through stand-in for kinds without a real codec.

use async_trait::async_trait;
use tracing::debug;

use super::error::EncoderError;
use super::traits::Encoder;
use super::types::{EncodeRequest, EncodedOutput};

/// Returns the input bytes unchanged under a relabeled name.
///
/// Used for audio and video. The target format is accepted as-is and not
/// applied; the output keeps the original name and extension.
#[derive(Debug, Clone)]
pub struct PassThroughEncoder {
    name: String,
    prefix: String,
}

impl PassThroughEncoder {
    /// Creates a pass-through encoder labelled `name` (e.g. "audio").
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl Encoder for PassThroughEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn convert(&self, request: EncodeRequest) -> Result<EncodedOutput, EncoderError> {
        // Completes after one scheduling tick, like any other async encoder.
        tokio::task::yield_now().await;

        debug!(
            encoder = %self.name,
            file = %request.file_name,
            target = %request.target,
            "Passing input through unchanged"
        );

        Ok(EncodedOutput {
            file_name: format!("{}{}", self.prefix, request.file_name),
            media_type: request.media_type.clone(),
            bytes: request.payload.to_vec(),
        })
    }
}
