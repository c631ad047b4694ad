//! File sources: where batch payloads are read from.
//!
//! A source reads one [`SourceFile`](crate::media::SourceFile) fully into
//! memory, reporting byte deltas on a progress channel as chunks arrive.

mod error;
mod fs_source;
mod traits;

pub use error::SourceError;
pub use fs_source::FsFileSource;
pub use traits::FileSource;
