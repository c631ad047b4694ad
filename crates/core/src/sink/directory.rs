//! Download sink writing outputs into a local directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::OutputConfig;
use crate::encoder::EncodedOutput;

use super::error::SinkError;
use super::traits::DownloadSink;

/// Writes each output as a file under one directory.
///
/// The directory is created on first use. An existing file with the same
/// name is overwritten.
#[derive(Debug, Clone)]
pub struct DirectoryDownloadSink {
    dir: PathBuf,
}

impl DirectoryDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a sink for the configured download directory.
    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.download_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Destination for an output name, ignoring any directory components.
    fn destination(&self, name: &str) -> Result<PathBuf, SinkError> {
        Path::new(name)
            .file_name()
            .map(|file_name| self.dir.join(file_name))
            .ok_or_else(|| SinkError::InvalidName {
                name: name.to_string(),
            })
    }
}

#[async_trait]
impl DownloadSink for DirectoryDownloadSink {
    fn name(&self) -> &str {
        "directory"
    }

    async fn trigger(&self, output: EncodedOutput) -> Result<(), SinkError> {
        let destination = self.destination(&output.file_name)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SinkError::DirectoryCreationFailed {
                path: self.dir.clone(),
                source,
            })?;

        tokio::fs::write(&destination, &output.bytes)
            .await
            .map_err(|source| SinkError::WriteFailed {
                path: destination.clone(),
                source,
            })?;

        info!(
            path = %destination.display(),
            size_bytes = output.size_bytes(),
            "Output downloaded"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn output(name: &str, bytes: &[u8]) -> EncodedOutput {
        EncodedOutput {
            file_name: name.to_string(),
            media_type: "application/pdf".to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_writes_into_created_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("downloads");
        let sink = DirectoryDownloadSink::new(&dir);

        sink.trigger(output("converted_a.pdf", b"%PDF-1.3")).await.unwrap();

        let written = tokio::fs::read(dir.join("converted_a.pdf")).await.unwrap();
        assert_eq!(written, b"%PDF-1.3");
    }

    #[tokio::test]
    async fn test_strips_directory_components() {
        let temp = TempDir::new().unwrap();
        let sink = DirectoryDownloadSink::new(temp.path());

        sink.trigger(output("../escape.pdf", b"x")).await.unwrap();
        assert!(temp.path().join("escape.pdf").exists());
    }

    #[tokio::test]
    async fn test_rejects_empty_name() {
        let temp = TempDir::new().unwrap();
        let sink = DirectoryDownloadSink::new(temp.path());

        let err = sink.trigger(output("..", b"x")).await.unwrap_err();
        assert!(matches!(err, SinkError::InvalidName { .. }));
    }

    #[test]
    fn test_from_config() {
        let sink = DirectoryDownloadSink::from_config(&OutputConfig::default());
        assert_eq!(sink.dir(), Path::new("downloads"));
    }
}
