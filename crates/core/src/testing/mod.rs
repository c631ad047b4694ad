//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the pipeline's
//! collaborator traits, so batches can be driven end to end without disk
//! access or real codecs.
//!
//! # Example
//!
//! ```rust,ignore
//! use batchconv_core::testing::{MockEncoder, MockFileSource, RecordingDownloadSink};
//!
//! let source = MockFileSource::new();
//! source.set_contents("a.txt", b"hello".to_vec()).await;
//!
//! let encoder = MockEncoder::new();
//! encoder.fail_file("b.png").await;
//!
//! let sink = RecordingDownloadSink::new();
//!
//! // Build a BatchPipeline around them...
//! ```

mod mock_encoder;
mod mock_sinks;
mod mock_source;

pub use mock_encoder::{MockEncoder, RecordedEncode};
pub use mock_sinks::{RecordingDownloadSink, RecordingPreviewSink};
pub use mock_source::MockFileSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::Cursor;

    use crate::media::SourceFile;

    /// A file entry whose payload is served by a mock source.
    pub fn virtual_file(name: &str, media_type: &str, size_bytes: u64) -> SourceFile {
        SourceFile::new(name, media_type, size_bytes, format!("/virtual/{}", name))
    }

    /// A plain text file entry sized for `text`.
    pub fn text_file(name: &str, text: &str) -> SourceFile {
        virtual_file(name, "text/plain", text.len() as u64)
    }

    /// A small valid PNG, `width` x `height`, filled with one color.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
        let mut bytes = Vec::new();
        // Encoding an in-memory buffer to PNG does not fail.
        let _ = image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png);
        bytes
    }
}
