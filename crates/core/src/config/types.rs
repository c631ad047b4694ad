use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub document: DocumentConfig,
}

/// Batch pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Capacity of the event channel handed to observers
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Whether image previews carry a generated thumbnail
    #[serde(default = "default_true")]
    pub thumbnails: bool,
    /// Longest edge of generated thumbnails, in pixels
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            event_buffer: default_event_buffer(),
            thumbnails: true,
            thumbnail_size: default_thumbnail_size(),
        }
    }
}

fn default_event_buffer() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_thumbnail_size() -> u32 {
    128
}

/// File reading configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Read chunk size in bytes; one progress event per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    64 * 1024
}

/// Output naming and download configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Prefix prepended to every output file name
    #[serde(default = "default_prefix")]
    pub filename_prefix: String,
    /// Directory the download sink writes into
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename_prefix: default_prefix(),
            download_dir: default_download_dir(),
        }
    }
}

fn default_prefix() -> String {
    "converted_".to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

/// Image encoder configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageConfig {
    /// JPEG quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

fn default_jpeg_quality() -> u8 {
    92
}

/// Text-to-PDF encoder configuration. Lengths in millimetres.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    #[serde(default = "default_page_width")]
    pub page_width_mm: f32,
    #[serde(default = "default_page_height")]
    pub page_height_mm: f32,
    #[serde(default = "default_margin")]
    pub margin_mm: f32,
    /// Font size in points
    #[serde(default = "default_font_size")]
    pub font_size_pt: f32,
    #[serde(default = "default_line_height")]
    pub line_height_mm: f32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            page_width_mm: default_page_width(),
            page_height_mm: default_page_height(),
            margin_mm: default_margin(),
            font_size_pt: default_font_size(),
            line_height_mm: default_line_height(),
        }
    }
}

// A4 portrait
fn default_page_width() -> f32 {
    210.0
}

fn default_page_height() -> f32 {
    297.0
}

fn default_margin() -> f32 {
    10.0
}

fn default_font_size() -> f32 {
    12.0
}

fn default_line_height() -> f32 {
    6.0
}
