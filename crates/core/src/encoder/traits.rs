//! Trait definitions for the encoder module.

use async_trait::async_trait;

use super::error::EncoderError;
use super::types::{EncodeRequest, EncodedOutput};

/// An encoder that turns one input payload into an output file.
///
/// One implementation exists per media kind. Encoders must not touch any
/// shared output channel; the pipeline hands the result to the download
/// sink itself.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Encodes the payload into the requested target format.
    async fn convert(&self, request: EncodeRequest) -> Result<EncodedOutput, EncoderError>;
}
