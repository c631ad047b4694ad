//! Events emitted to an observer while a batch runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::media::{MediaKind, TargetFormat};

/// Progress update for a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Batch accepted.
    Submitted {
        job_id: Uuid,
        files: usize,
        total_bytes: u64,
    },
    /// Bytes read so far. May be dropped when the observer lags.
    IngestProgress {
        job_id: Uuid,
        loaded_bytes: u64,
        total_bytes: u64,
        percent: u8,
    },
    /// One file read and previewed.
    FileIngested {
        job_id: Uuid,
        file: String,
        kind: MediaKind,
        size_bytes: u64,
    },
    /// One file could not be read and was dropped from the batch.
    ReadFailed {
        job_id: Uuid,
        file: String,
        reason: String,
    },
    /// Ingest done; waiting for a target format.
    AwaitingFormat {
        job_id: Uuid,
        kind: MediaKind,
        formats: Vec<TargetFormat>,
    },
    /// Starting one file.
    Converting {
        job_id: Uuid,
        index: usize,
        total: usize,
        file: String,
    },
    /// One file converted and handed to the download sink.
    ItemConverted {
        job_id: Uuid,
        file: String,
        output: String,
        size_bytes: u64,
        percent: u8,
    },
    /// One file failed; the batch continues.
    ItemFailed {
        job_id: Uuid,
        file: String,
        error: String,
        percent: u8,
    },
    /// Batch finished.
    Completed {
        job_id: Uuid,
        succeeded: usize,
        failed: usize,
        message: String,
    },
}

impl PipelineEvent {
    pub fn job_id(&self) -> Uuid {
        match self {
            Self::Submitted { job_id, .. }
            | Self::IngestProgress { job_id, .. }
            | Self::FileIngested { job_id, .. }
            | Self::ReadFailed { job_id, .. }
            | Self::AwaitingFormat { job_id, .. }
            | Self::Converting { job_id, .. }
            | Self::ItemConverted { job_id, .. }
            | Self::ItemFailed { job_id, .. }
            | Self::Completed { job_id, .. } => *job_id,
        }
    }
}
