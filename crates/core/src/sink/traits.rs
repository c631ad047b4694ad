//! Trait definitions for the sink module.

use async_trait::async_trait;

use crate::encoder::EncodedOutput;

use super::error::SinkError;
use super::preview::Preview;

/// Delivers converted outputs to the user.
///
/// One sink is shared by the whole pipeline; the pipeline never triggers
/// it for two outputs at once.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Returns the name of this sink implementation.
    fn name(&self) -> &str;

    /// Hands one output over for download.
    async fn trigger(&self, output: EncodedOutput) -> Result<(), SinkError>;
}

/// Displays a preview of each ingested file. Never fails.
pub trait PreviewSink: Send + Sync {
    fn show(&self, preview: Preview);
}
