//! Output sinks for converted files and ingest previews.
//!
//! - `DownloadSink`: the single shared channel converted outputs leave through.
//! - `PreviewSink`: fire-and-forget display of each ingested file.

mod directory;
mod error;
mod preview;
mod traits;

pub use directory::DirectoryDownloadSink;
pub use error::SinkError;
pub use preview::{Preview, TracingPreviewSink};
pub use traits::{DownloadSink, PreviewSink};
