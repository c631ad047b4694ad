//! Media description types shared by the whole pipeline.
//!
//! A [`SourceFile`] is the immutable description of one user supplied
//! input. Its declared media type is classified into a coarse
//! [`MediaKind`] which drives both the legal target formats and the
//! encoder a file is dispatched to.

mod types;

pub use types::{guess_media_type, file_stem, MediaKind, SourceFile, TargetFormat, DOCX_MEDIA_TYPE};
