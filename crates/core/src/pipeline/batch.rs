//! Batch pipeline implementation.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex, MutexGuard, Semaphore};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::FormatCatalog;
use crate::config::{Config, PipelineConfig};
use crate::encoder::{thumbnail, EncodeRequest, EncodedOutput};
use crate::history::HistoryLog;
use crate::media::{MediaKind, SourceFile, TargetFormat};
use crate::metrics::{
    BATCHES_SUBMITTED, BATCHES_TOTAL, CONVERSIONS_TOTAL, CONVERSION_DURATION, INGEST_BYTES,
    READ_FAILURES,
};
use crate::progress::{ProgressSnapshot, ProgressTracker};
use crate::sink::{DirectoryDownloadSink, DownloadSink, Preview, PreviewSink, TracingPreviewSink};
use crate::source::{FileSource, FsFileSource, SourceError};

use super::error::PipelineError;
use super::events::PipelineEvent;
use super::job::{BatchJob, BatchOutcome, BatchState};

/// Final message of every batch, whatever its item results.
pub const COMPLETION_MESSAGE: &str = "All files converted successfully!";

const START_MESSAGE: &str = "Starting conversion...";

/// State shared by every clone of a pipeline.
#[derive(Debug, Default)]
struct Shared {
    active: Option<Uuid>,
    progress: ProgressTracker,
}

/// What the download sink received for one file.
struct Delivered {
    file_name: String,
    size_bytes: u64,
}

/// Drives batches from submission to completion.
///
/// At most one batch is active. Submitting a new batch supersedes the
/// previous one: its driver stops at the next check and records nothing
/// more. One conversion (encoder plus download) runs at a time across all
/// clones of the pipeline.
#[derive(Clone)]
pub struct BatchPipeline {
    config: PipelineConfig,
    catalog: FormatCatalog,
    source: Arc<dyn FileSource>,
    download: Arc<dyn DownloadSink>,
    preview: Arc<dyn PreviewSink>,
    history: HistoryLog,
    shared: Arc<Mutex<Shared>>,
    conversion_permit: Arc<Semaphore>,
    events: Option<mpsc::Sender<PipelineEvent>>,
}

impl BatchPipeline {
    /// Creates a pipeline with the default catalog for `config`.
    pub fn new(
        config: &Config,
        source: Arc<dyn FileSource>,
        download: Arc<dyn DownloadSink>,
    ) -> Self {
        Self {
            config: config.pipeline.clone(),
            catalog: FormatCatalog::from_config(config),
            source,
            download,
            preview: Arc::new(TracingPreviewSink),
            history: HistoryLog::new(),
            shared: Arc::new(Mutex::new(Shared::default())),
            conversion_permit: Arc::new(Semaphore::new(1)),
            events: None,
        }
    }

    /// Creates a pipeline reading from disk and writing to the configured
    /// download directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config,
            Arc::new(FsFileSource::new(&config.source)),
            Arc::new(DirectoryDownloadSink::from_config(&config.output)),
        )
    }

    /// Replaces the format catalog.
    pub fn with_catalog(mut self, catalog: FormatCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_preview_sink(mut self, preview: Arc<dyn PreviewSink>) -> Self {
        self.preview = preview;
        self
    }

    /// Shares an existing history log.
    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = history;
        self
    }

    /// Sets the observer channel for pipeline events.
    pub fn with_events(mut self, events: mpsc::Sender<PipelineEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn catalog(&self) -> &FormatCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Progress of the active batch.
    pub async fn progress(&self) -> ProgressSnapshot {
        self.shared.lock().await.progress.snapshot()
    }

    /// Id of the active batch, if any was submitted.
    pub async fn active_job(&self) -> Option<Uuid> {
        self.shared.lock().await.active
    }

    /// Accepts a new batch and makes it the active one.
    ///
    /// Any earlier batch is superseded and its progress discarded.
    pub async fn submit(&self, files: Vec<SourceFile>) -> Result<BatchJob, PipelineError> {
        if files.is_empty() {
            BATCHES_TOTAL.with_label_values(&["empty"]).inc();
            return Err(PipelineError::EmptyBatch);
        }

        let mut job = BatchJob::new(files);
        let total_bytes = job.total_bytes();

        {
            let mut shared = self.shared.lock().await;
            if let Some(previous) = shared.active.replace(job.id) {
                info!(job_id = %job.id, superseded = %previous, "Superseding active batch");
            }
            shared.progress.begin_ingest(total_bytes);
            self.history.line(START_MESSAGE).await;
        }

        job.state = BatchState::Ingesting;
        BATCHES_SUBMITTED.inc();

        info!(
            job_id = %job.id,
            files = job.files.len(),
            total_bytes,
            "Batch submitted"
        );

        self.emit(PipelineEvent::Submitted {
            job_id: job.id,
            files: job.files.len(),
            total_bytes,
        })
        .await;

        Ok(job)
    }

    /// Reads every file of the batch and returns the formats on offer.
    ///
    /// Each file is previewed as soon as its own read settles. Unreadable
    /// files are dropped from the batch. The offered formats come from the
    /// kind of the first readable file.
    pub async fn ingest(&self, job: &mut BatchJob) -> Result<Vec<TargetFormat>, PipelineError> {
        expect_state(job, BatchState::Ingesting)?;
        drop(self.lock_active(job.id).await?);

        let job_id = job.id;
        let (delta_tx, mut delta_rx) = mpsc::channel::<u64>(self.config.event_buffer.max(1));

        let reads = join_all(
            job.files
                .iter()
                .map(|file| self.ingest_one(job_id, file, delta_tx.clone())),
        );
        drop(delta_tx);

        let drain = async {
            while let Some(delta) = delta_rx.recv().await {
                let snapshot = {
                    let mut shared = self.shared.lock().await;
                    if shared.active != Some(job_id) {
                        continue;
                    }
                    shared.progress.on_bytes_loaded(delta);
                    shared.progress.snapshot()
                };
                self.try_emit(PipelineEvent::IngestProgress {
                    job_id,
                    loaded_bytes: snapshot.ingest_loaded_bytes,
                    total_bytes: snapshot.ingest_total_bytes,
                    percent: snapshot.ingest_percent,
                });
            }
        };

        let (results, ()) = tokio::join!(reads, drain);

        let files = std::mem::take(&mut job.files);
        let mut ingested = Vec::with_capacity(files.len());
        let mut failures = Vec::new();

        for (file, result) in files.into_iter().zip(results) {
            match result {
                Ok(payload) => ingested.push((file, payload)),
                Err(e) => {
                    READ_FAILURES.inc();
                    warn!(job_id = %job_id, file = %file.name, error = %e, "Failed to read file");
                    failures.push(PipelineError::ReadFailure {
                        file: file.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        {
            let _shared = match self.lock_active(job_id).await {
                Ok(shared) => shared,
                Err(e) => {
                    job.files = ingested.into_iter().map(|(file, _)| file).collect();
                    return Err(self.abandon(job, e));
                }
            };
            for failure in &failures {
                self.history.line(failure.to_string()).await;
            }
        }

        for failure in failures {
            if let PipelineError::ReadFailure { file, reason } = failure {
                self.emit(PipelineEvent::ReadFailed {
                    job_id,
                    file: file.clone(),
                    reason,
                })
                .await;
                job.unreadable.push(file);
            }
        }

        let (files, payloads): (Vec<_>, Vec<_>) = ingested.into_iter().unzip();
        job.files = files;
        job.payloads = payloads;

        let Some(governing) = job.files.first().map(SourceFile::kind) else {
            job.state = BatchState::Completed;
            BATCHES_TOTAL.with_label_values(&["empty"]).inc();
            warn!(job_id = %job_id, "No readable files in batch");
            return Err(PipelineError::EmptyBatch);
        };

        let formats = self.catalog.legal_formats(governing).to_vec();
        job.governing_kind = Some(governing);
        job.legal_formats = formats.clone();
        job.state = BatchState::AwaitingFormatChoice;

        info!(
            job_id = %job_id,
            files = job.files.len(),
            kind = %governing,
            formats = formats.len(),
            "Batch ingested"
        );

        self.emit(PipelineEvent::AwaitingFormat {
            job_id,
            kind: governing,
            formats: formats.clone(),
        })
        .await;

        Ok(formats)
    }

    /// Applies the chosen format to the whole batch and converts it.
    ///
    /// Files are converted one at a time in submission order. Item failures
    /// are logged and do not stop the batch.
    pub async fn choose_format(
        &self,
        job: &mut BatchJob,
        format: &str,
    ) -> Result<BatchOutcome, PipelineError> {
        expect_state(job, BatchState::AwaitingFormatChoice)?;

        let target = TargetFormat::parse(format)
            .filter(|t| job.legal_formats.contains(t))
            .ok_or_else(|| PipelineError::InvalidFormat {
                format: format.to_string(),
            })?;

        {
            let mut shared = self.lock_active(job.id).await?;
            shared.progress.begin_convert(job.files.len());
        }

        info!(job_id = %job.id, target = %target, files = job.files.len(), "Format chosen");

        job.target = Some(target);
        job.state = BatchState::Converting;

        self.convert_remaining(job).await
    }

    /// Converts from the cursor to the end of the batch.
    async fn convert_remaining(&self, job: &mut BatchJob) -> Result<BatchOutcome, PipelineError> {
        let Some(target) = job.target.clone() else {
            return Err(PipelineError::InvalidState {
                expected: BatchState::Converting,
                actual: job.state,
            });
        };
        let total = job.files.len();

        while job.cursor < total {
            let index = job.cursor;
            let file = job.files[index].clone();
            let kind = file.kind();

            if let Err(e) = self.lock_active(job.id).await {
                return Err(self.abandon(job, e));
            }

            self.emit(PipelineEvent::Converting {
                job_id: job.id,
                index,
                total,
                file: file.name.clone(),
            })
            .await;

            let start = Instant::now();
            let payload = Arc::clone(&job.payloads[index]);
            let permit = self.conversion_permit.acquire().await;
            let encoded = match &permit {
                Ok(_) => self.encode_one(job.id, &file, kind, payload, &target).await,
                Err(e) => Err(PipelineError::conversion_failure(&file.name, e)),
            };

            // Delivery and recording happen under the state lock, so a new
            // submission either supersedes this item before its download or
            // after it is recorded.
            let (result, percent) = {
                let mut shared = match self.lock_active(job.id).await {
                    Ok(shared) => shared,
                    Err(e) => return Err(self.abandon(job, e)),
                };
                let result = match encoded {
                    Ok(output) => self.deliver(&file, output).await,
                    Err(e) => Err(e),
                };
                match &result {
                    Ok(_) => {
                        self.history.record(file.name.as_str()).await;
                        self.history.line(format!("Converted: {}", file.name)).await;
                    }
                    Err(e) => {
                        self.history.record_failure(&file.name, &e.item_reason()).await;
                    }
                }
                shared.progress.on_item_done();
                (result, shared.progress.convert_percent())
            };
            drop(permit);
            job.cursor += 1;

            CONVERSION_DURATION
                .with_label_values(&[kind.as_str()])
                .observe(start.elapsed().as_secs_f64());

            match result {
                Ok(delivered) => {
                    job.succeeded += 1;
                    CONVERSIONS_TOTAL
                        .with_label_values(&[kind.as_str(), "success"])
                        .inc();
                    debug!(
                        job_id = %job.id,
                        file = %file.name,
                        output = %delivered.file_name,
                        size_bytes = delivered.size_bytes,
                        "File converted"
                    );
                    self.emit(PipelineEvent::ItemConverted {
                        job_id: job.id,
                        file: file.name,
                        output: delivered.file_name,
                        size_bytes: delivered.size_bytes,
                        percent,
                    })
                    .await;
                }
                Err(e) => {
                    job.failed += 1;
                    let label = match e {
                        PipelineError::UnsupportedKind { .. } => "unsupported",
                        _ => "failed",
                    };
                    CONVERSIONS_TOTAL
                        .with_label_values(&[kind.as_str(), label])
                        .inc();
                    warn!(job_id = %job.id, file = %file.name, error = %e, "File conversion failed");
                    self.emit(PipelineEvent::ItemFailed {
                        job_id: job.id,
                        file: file.name,
                        error: e.to_string(),
                        percent,
                    })
                    .await;
                }
            }
        }

        job.state = BatchState::Completed;
        BATCHES_TOTAL.with_label_values(&["completed"]).inc();

        let outcome = BatchOutcome {
            job_id: job.id,
            target,
            succeeded: job.succeeded,
            failed: job.failed,
            message: COMPLETION_MESSAGE.to_string(),
            duration_ms: job.started_at.elapsed().as_millis() as u64,
        };

        info!(
            job_id = %job.id,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            duration_ms = outcome.duration_ms,
            "{}",
            COMPLETION_MESSAGE
        );

        self.emit(PipelineEvent::Completed {
            job_id: job.id,
            succeeded: outcome.succeeded,
            failed: outcome.failed,
            message: outcome.message.clone(),
        })
        .await;

        Ok(outcome)
    }

    /// Encodes one file. The caller holds the conversion permit.
    async fn encode_one(
        &self,
        job_id: Uuid,
        file: &SourceFile,
        kind: MediaKind,
        payload: Arc<[u8]>,
        target: &TargetFormat,
    ) -> Result<EncodedOutput, PipelineError> {
        let encoder = self
            .catalog
            .encoder_for(kind)
            .ok_or_else(|| PipelineError::UnsupportedKind {
                file: file.name.clone(),
                media_type: file.media_type.clone(),
            })?;

        debug!(
            job_id = %job_id,
            file = %file.name,
            encoder = encoder.name(),
            target = %target,
            "Converting file"
        );

        let request = EncodeRequest::new(
            file.name.clone(),
            file.media_type.clone(),
            payload,
            target.clone(),
        );
        encoder
            .convert(request)
            .await
            .map_err(|e| PipelineError::conversion_failure(&file.name, e))
    }

    async fn deliver(
        &self,
        file: &SourceFile,
        output: EncodedOutput,
    ) -> Result<Delivered, PipelineError> {
        let delivered = Delivered {
            file_name: output.file_name.clone(),
            size_bytes: output.size_bytes(),
        };
        self.download
            .trigger(output)
            .await
            .map_err(|e| PipelineError::conversion_failure(&file.name, e))?;

        Ok(delivered)
    }

    /// Reads one file, then previews it and reports it ingested.
    async fn ingest_one(
        &self,
        job_id: Uuid,
        file: &SourceFile,
        deltas: mpsc::Sender<u64>,
    ) -> Result<Arc<[u8]>, SourceError> {
        let bytes = self.read_one(file, deltas).await?;
        INGEST_BYTES.inc_by(bytes.len() as u64);
        let payload = Arc::<[u8]>::from(bytes);

        self.show_preview(file, &payload).await;
        self.emit(PipelineEvent::FileIngested {
            job_id,
            file: file.name.clone(),
            kind: file.kind(),
            size_bytes: file.size_bytes,
        })
        .await;

        Ok(payload)
    }

    /// Reads one file, forwarding its byte deltas.
    ///
    /// Whatever part of the declared size the source did not report is
    /// credited once the read settles, so ingest always reaches its total.
    async fn read_one(
        &self,
        file: &SourceFile,
        deltas: mpsc::Sender<u64>,
    ) -> Result<Vec<u8>, SourceError> {
        let (tx, mut rx) = mpsc::channel::<u64>(self.config.event_buffer.max(1));

        let forward = async {
            let mut reported = 0u64;
            while let Some(delta) = rx.recv().await {
                reported = reported.saturating_add(delta);
                let _ = deltas.send(delta).await;
            }
            reported
        };

        let (result, reported) = tokio::join!(self.source.read(file, tx), forward);

        let shortfall = file.size_bytes.saturating_sub(reported);
        if shortfall > 0 {
            let _ = deltas.send(shortfall).await;
        }

        result
    }

    async fn show_preview(&self, file: &SourceFile, payload: &Arc<[u8]>) {
        let kind = file.kind();
        let thumb = if kind == MediaKind::Image && self.config.thumbnails {
            let payload = Arc::clone(payload);
            let max_edge = self.config.thumbnail_size;
            tokio::task::spawn_blocking(move || thumbnail(&payload, max_edge))
                .await
                .ok()
                .flatten()
        } else {
            None
        };

        self.preview.show(Preview {
            file_name: file.name.clone(),
            size_bytes: file.size_bytes,
            kind,
            thumbnail: thumb,
        });
    }

    /// Locks the shared state if `job_id` is still the active batch.
    async fn lock_active(&self, job_id: Uuid) -> Result<MutexGuard<'_, Shared>, PipelineError> {
        let shared = self.shared.lock().await;
        if shared.active == Some(job_id) {
            Ok(shared)
        } else {
            Err(PipelineError::Superseded { job_id })
        }
    }

    fn abandon(&self, job: &BatchJob, error: PipelineError) -> PipelineError {
        BATCHES_TOTAL.with_label_values(&["superseded"]).inc();
        info!(
            job_id = %job.id,
            state = %job.state,
            converted = job.cursor,
            "Batch superseded, stopping"
        );
        error
    }

    async fn emit(&self, event: PipelineEvent) {
        if let Some(ref tx) = self.events {
            let _ = tx.send(event).await;
        }
    }

    /// Emits without waiting; used for high-frequency progress updates.
    fn try_emit(&self, event: PipelineEvent) {
        if let Some(ref tx) = self.events {
            if tx.try_send(event).is_err() {
                debug!("Event channel full, dropping progress update");
            }
        }
    }
}

fn expect_state(job: &BatchJob, expected: BatchState) -> Result<(), PipelineError> {
    if job.state == expected {
        Ok(())
    } else {
        Err(PipelineError::InvalidState {
            expected,
            actual: job.state,
        })
    }
}
