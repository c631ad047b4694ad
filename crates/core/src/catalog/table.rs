//! Static table of legal target formats per media kind.

use once_cell::sync::Lazy;

use crate::media::{MediaKind, TargetFormat};

static IMAGE_FORMATS: Lazy<Vec<TargetFormat>> =
    Lazy::new(|| tokens(&["png", "jpeg", "bmp", "gif", "tiff", "webp"]));
static DOCUMENT_FORMATS: Lazy<Vec<TargetFormat>> = Lazy::new(|| tokens(&["pdf"]));
static AUDIO_FORMATS: Lazy<Vec<TargetFormat>> =
    Lazy::new(|| tokens(&["mp3", "wav", "ogg", "flac"]));
static VIDEO_FORMATS: Lazy<Vec<TargetFormat>> =
    Lazy::new(|| tokens(&["mp4", "avi", "mkv", "mov"]));

fn tokens(list: &[&'static str]) -> Vec<TargetFormat> {
    list.iter().copied().map(TargetFormat::from_static).collect()
}

/// Ordered legal target formats for a kind. Empty for `Unsupported`.
pub(crate) fn legal_formats(kind: MediaKind) -> &'static [TargetFormat] {
    match kind {
        MediaKind::Image => IMAGE_FORMATS.as_slice(),
        MediaKind::PlainText | MediaKind::Document | MediaKind::Csv => DOCUMENT_FORMATS.as_slice(),
        MediaKind::Audio => AUDIO_FORMATS.as_slice(),
        MediaKind::Video => VIDEO_FORMATS.as_slice(),
        MediaKind::Unsupported => &[],
    }
}
