//! File system source implementation.

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::SourceConfig;
use crate::media::SourceFile;

use super::error::SourceError;
use super::traits::FileSource;

/// Upper bound on the buffer reserved up front, in chunks. Declared sizes
/// are not trusted.
const MAX_RESERVED_CHUNKS: usize = 16;

/// Reads files from local disk in fixed-size chunks.
#[derive(Debug, Clone)]
pub struct FsFileSource {
    chunk_size: usize,
}

impl FsFileSource {
    /// Creates a new file system source with the given configuration.
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Creates a source with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(&SourceConfig::default())
    }
}

#[async_trait]
impl FileSource for FsFileSource {
    fn name(&self) -> &str {
        "fs"
    }

    async fn read(
        &self,
        file: &SourceFile,
        progress: mpsc::Sender<u64>,
    ) -> Result<Vec<u8>, SourceError> {
        let mut handle = File::open(&file.path)
            .await
            .map_err(|e| SourceError::from_open(file.path.clone(), e))?;

        let reserved = usize::try_from(file.size_bytes)
            .unwrap_or(usize::MAX)
            .min(self.chunk_size.saturating_mul(MAX_RESERVED_CHUNKS));
        let mut payload = Vec::with_capacity(reserved);
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            let read = handle.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            payload.extend_from_slice(&chunk[..read]);
            let _ = progress.send(read as u64).await;
        }

        debug!(
            file = %file.name,
            path = %file.path.display(),
            size_bytes = payload.len(),
            "File read"
        );

        Ok(payload)
    }
}
