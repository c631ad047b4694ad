//! Batch conversion pipeline.
//!
//! A batch moves through `submit` → `ingest` → `choose_format`. The caller
//! owns the [`BatchJob`] and passes it back into each step; the pipeline
//! owns the active-batch marker, progress and history.
//!
//! # Example
//!
//! ```ignore
//! use batchconv_core::config::Config;
//! use batchconv_core::media::SourceFile;
//! use batchconv_core::pipeline::BatchPipeline;
//!
//! let pipeline = BatchPipeline::from_config(&Config::default());
//!
//! let files = vec![SourceFile::from_path("notes.txt").await?];
//! let mut job = pipeline.submit(files).await?;
//! let formats = pipeline.ingest(&mut job).await?;
//!
//! let outcome = pipeline.choose_format(&mut job, formats[0].as_str()).await?;
//! println!("{} ({} failed)", outcome.message, outcome.failed);
//! ```

mod batch;
mod error;
mod events;
mod job;

pub use batch::{BatchPipeline, COMPLETION_MESSAGE};
pub use error::PipelineError;
pub use events::PipelineEvent;
pub use job::{BatchJob, BatchOutcome, BatchState};
