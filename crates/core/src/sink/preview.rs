//! Ingest previews.

use serde::Serialize;
use tracing::info;

use crate::media::MediaKind;

use super::traits::PreviewSink;

/// What is shown for one ingested file.
#[derive(Clone, Serialize)]
pub struct Preview {
    pub file_name: String,
    pub size_bytes: u64,
    pub kind: MediaKind,
    /// PNG thumbnail, only for images when thumbnails are enabled.
    #[serde(skip)]
    pub thumbnail: Option<Vec<u8>>,
}

impl std::fmt::Debug for Preview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preview")
            .field("file_name", &self.file_name)
            .field("size_bytes", &self.size_bytes)
            .field("kind", &self.kind)
            .field("thumbnail_bytes", &self.thumbnail.as_ref().map(Vec::len))
            .finish()
    }
}

/// Preview sink that only logs what it would display.
#[derive(Debug, Clone, Default)]
pub struct TracingPreviewSink;

impl PreviewSink for TracingPreviewSink {
    fn show(&self, preview: Preview) {
        info!(
            file = %preview.file_name,
            size_bytes = preview.size_bytes,
            kind = %preview.kind,
            has_thumbnail = preview.thumbnail.is_some(),
            "Preview"
        );
    }
}
