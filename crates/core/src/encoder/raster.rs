//! Raster image re-encoder built on the `image` crate.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

use crate::config::ImageConfig;

use super::error::EncoderError;
use super::traits::Encoder;
use super::types::{EncodeRequest, EncodedOutput};

/// Decodes any supported raster image and re-encodes it into the target.
#[derive(Debug, Clone)]
pub struct ImageEncoder {
    jpeg_quality: u8,
    prefix: String,
}

impl ImageEncoder {
    /// Creates a new image encoder.
    pub fn new(config: &ImageConfig, prefix: impl Into<String>) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            prefix: prefix.into(),
        }
    }

    /// Creates an image encoder with default settings.
    pub fn with_defaults() -> Self {
        Self::new(&ImageConfig::default(), "converted_")
    }
}

/// Maps a target token to a raster format this encoder can write.
fn raster_format(target: &str) -> Option<ImageFormat> {
    match target {
        "png" => Some(ImageFormat::Png),
        "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
        "bmp" => Some(ImageFormat::Bmp),
        "gif" => Some(ImageFormat::Gif),
        "tiff" | "tif" => Some(ImageFormat::Tiff),
        "webp" => Some(ImageFormat::WebP),
        "ico" => Some(ImageFormat::Ico),
        _ => None,
    }
}

fn mime_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Ico => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Encodes a decoded image into `format`.
///
/// JPEG cannot carry alpha and the GIF, WebP, ICO and BMP writers only
/// accept 8-bit buffers, so the image is narrowed first where needed.
fn encode(img: &DynamicImage, format: ImageFormat, jpeg_quality: u8) -> Result<Vec<u8>, EncoderError> {
    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);

    match format {
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut cursor, jpeg_quality))
                .map_err(|e| EncoderError::encode_failed(e.to_string()))?;
        }
        ImageFormat::Gif | ImageFormat::WebP | ImageFormat::Ico | ImageFormat::Bmp => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_to(&mut cursor, format)
                .map_err(|e| EncoderError::encode_failed(e.to_string()))?;
        }
        _ => {
            img.write_to(&mut cursor, format)
                .map_err(|e| EncoderError::encode_failed(e.to_string()))?;
        }
    }

    Ok(bytes)
}

/// Renders a PNG thumbnail whose longest edge is at most `max_edge` pixels.
///
/// Returns `None` when the payload is not a decodable image.
pub fn thumbnail(payload: &[u8], max_edge: u32) -> Option<Vec<u8>> {
    let img = image::load_from_memory(payload).ok()?;
    let thumb = img.thumbnail(max_edge, max_edge);
    encode(&thumb, ImageFormat::Png, 0).ok()
}

#[async_trait]
impl Encoder for ImageEncoder {
    fn name(&self) -> &str {
        "image"
    }

    async fn convert(&self, request: EncodeRequest) -> Result<EncodedOutput, EncoderError> {
        let format = raster_format(request.target.as_str())
            .ok_or_else(|| EncoderError::unsupported_target(self.name(), request.target.as_str()))?;

        let file_name = request.output_name(&self.prefix, request.target.as_str());
        let payload = request.payload.clone();
        let jpeg_quality = self.jpeg_quality;

        let bytes = tokio::task::spawn_blocking(move || {
            let img = image::load_from_memory(&payload)
                .map_err(|e| EncoderError::decode_failed(e.to_string()))?;
            encode(&img, format, jpeg_quality)
        })
        .await??;

        debug!(
            file = %request.file_name,
            output = %file_name,
            size_bytes = bytes.len(),
            "Image re-encoded"
        );

        Ok(EncodedOutput {
            file_name,
            media_type: mime_type(format).to_string(),
            bytes,
        })
    }
}
