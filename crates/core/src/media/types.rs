//! Types for the media module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Declared media type of Word (OOXML) documents.
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Coarse classification of a file, derived from its declared media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Any `image/*` type.
    Image,
    /// `text/plain`.
    PlainText,
    /// Word (OOXML) document.
    Document,
    /// `text/csv`.
    Csv,
    /// Any `audio/*` type.
    Audio,
    /// Any `video/*` type.
    Video,
    /// Anything else. Only an error once conversion is attempted.
    Unsupported,
}

impl MediaKind {
    /// Classifies a declared media type. First match wins.
    pub fn classify(media_type: &str) -> Self {
        if media_type.starts_with("image/") {
            Self::Image
        } else if media_type.starts_with("text/plain") {
            Self::PlainText
        } else if media_type.starts_with(DOCX_MEDIA_TYPE) {
            Self::Document
        } else if media_type.starts_with("text/csv") {
            Self::Csv
        } else if media_type.starts_with("audio/") {
            Self::Audio
        } else if media_type.starts_with("video/") {
            Self::Video
        } else {
            Self::Unsupported
        }
    }

    /// Returns the label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::PlainText => "plain_text",
            Self::Document => "document",
            Self::Csv => "csv",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Unsupported => "unsupported",
        }
    }

    /// Whether the kind is rendered as text by the document encoder.
    pub fn is_text_like(&self) -> bool {
        matches!(self, Self::PlainText | Self::Document | Self::Csv)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A target format token such as `png` or `pdf`.
///
/// Always lowercase and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetFormat(String);

impl TargetFormat {
    /// Parses a user supplied token. Returns `None` for blank input.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self(token.to_ascii_lowercase()))
    }

    pub(crate) fn from_static(token: &'static str) -> Self {
        Self(token.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TargetFormat {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One user supplied input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File name shown to the user (no directory).
    pub name: String,
    /// Declared media type, empty when unknown.
    pub media_type: String,
    /// Declared size in bytes.
    pub size_bytes: u64,
    /// Where the payload is read from.
    pub path: PathBuf,
}

impl SourceFile {
    /// Creates a source file from explicit parts.
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        size_bytes: u64,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size_bytes,
            path: path.into(),
        }
    }

    /// Describes a file on disk, guessing its media type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let media_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(guess_media_type)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            name,
            media_type,
            size_bytes: metadata.len(),
            path: path.to_path_buf(),
        })
    }

    /// Classifies the declared media type.
    pub fn kind(&self) -> MediaKind {
        MediaKind::classify(&self.media_type)
    }
}

/// Maps a file extension to a media type.
pub fn guess_media_type(extension: &str) -> Option<&'static str> {
    let media_type = match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "txt" | "text" | "log" | "md" => "text/plain",
        "csv" => "text/csv",
        "docx" => DOCX_MEDIA_TYPE,
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "mp4" | "m4v" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(media_type)
}

/// Returns the file name up to its first `.`.
///
/// `archive.tar.gz` yields `archive`; a leading-dot name yields an empty stem.
pub fn file_stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}
