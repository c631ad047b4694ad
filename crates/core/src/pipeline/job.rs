//! Batch job state owned by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::media::{MediaKind, SourceFile, TargetFormat};

/// Lifecycle of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    Idle,
    Ingesting,
    AwaitingFormatChoice,
    Converting,
    Completed,
}

impl BatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ingesting => "ingesting",
            Self::AwaitingFormatChoice => "awaiting_format_choice",
            Self::Converting => "converting",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted batch.
///
/// Created by `BatchPipeline::submit` and passed back into every later
/// operation. Fields are read-only from outside the pipeline.
pub struct BatchJob {
    pub(crate) id: Uuid,
    pub(crate) files: Vec<SourceFile>,
    pub(crate) payloads: Vec<Arc<[u8]>>,
    pub(crate) unreadable: Vec<String>,
    pub(crate) cursor: usize,
    pub(crate) target: Option<TargetFormat>,
    pub(crate) governing_kind: Option<MediaKind>,
    pub(crate) legal_formats: Vec<TargetFormat>,
    pub(crate) state: BatchState,
    pub(crate) succeeded: usize,
    pub(crate) failed: usize,
    pub(crate) started_at: Instant,
}

impl BatchJob {
    pub(crate) fn new(files: Vec<SourceFile>) -> Self {
        Self {
            id: Uuid::new_v4(),
            files,
            payloads: Vec::new(),
            unreadable: Vec::new(),
            cursor: 0,
            target: None,
            governing_kind: None,
            legal_formats: Vec::new(),
            state: BatchState::Idle,
            succeeded: 0,
            failed: 0,
            started_at: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Files in submission order. After ingest, only the readable ones.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Names of files dropped because they could not be read.
    pub fn unreadable(&self) -> &[String] {
        &self.unreadable
    }

    /// Index of the next file to convert.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn target(&self) -> Option<&TargetFormat> {
        self.target.as_ref()
    }

    /// Kind of the first ingested file; decides the offered formats.
    pub fn governing_kind(&self) -> Option<MediaKind> {
        self.governing_kind
    }

    pub fn legal_formats(&self) -> &[TargetFormat] {
        &self.legal_formats
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }
}

impl fmt::Debug for BatchJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchJob")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("files", &self.files.len())
            .field("cursor", &self.cursor)
            .field("target", &self.target)
            .field("governing_kind", &self.governing_kind)
            .finish()
    }
}

/// Result of a finished batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub job_id: Uuid,
    pub target: TargetFormat,
    pub succeeded: usize,
    pub failed: usize,
    /// Aggregate message, the same regardless of item failures.
    pub message: String,
    pub duration_ms: u64,
}
