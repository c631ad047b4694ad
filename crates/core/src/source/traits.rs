//! Trait definitions for the source module.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::media::SourceFile;

use super::error::SourceError;

/// Reads file payloads for a batch.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Returns the name of this source implementation.
    fn name(&self) -> &str;

    /// Reads the whole payload of `file`.
    ///
    /// The number of bytes read is sent on `progress` after every chunk.
    /// If the receiver is dropped, reading continues without reporting.
    async fn read(
        &self,
        file: &SourceFile,
        progress: mpsc::Sender<u64>,
    ) -> Result<Vec<u8>, SourceError>;
}
