//! Mock encoder for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};

use crate::encoder::{EncodeRequest, EncodedOutput, Encoder, EncoderError};
use crate::media::TargetFormat;

/// A recorded encode call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedEncode {
    /// Input file name.
    pub file_name: String,
    /// Requested format.
    pub target: TargetFormat,
    /// Whether the encode succeeded.
    pub success: bool,
}

/// Mock implementation of the Encoder trait.
///
/// Provides controllable behavior for testing:
/// - Track encode calls for assertions
/// - Fail always for chosen files, or once via `set_next_error`
/// - Simulate slow encoders and pause them mid-batch
/// - Measure how many calls overlapped
///
/// # Example
///
/// ```rust,ignore
/// use batchconv_core::testing::MockEncoder;
///
/// let encoder = MockEncoder::new();
/// encoder.fail_file("broken.png").await;
///
/// // Register with a catalog, run a batch...
///
/// let calls = encoder.recorded_encodes().await;
/// assert!(!calls[1].success);
/// assert_eq!(encoder.max_in_flight(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockEncoder {
    name: String,
    /// Recorded encode calls.
    encodes: Arc<RwLock<Vec<RecordedEncode>>>,
    /// Files that always fail.
    failing: Arc<RwLock<HashSet<String>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<EncoderError>>>,
    /// Simulated encode duration in milliseconds.
    duration_ms: Arc<RwLock<u64>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
    started_notify: Arc<Notify>,
    paused: Arc<AtomicBool>,
    resume_notify: Arc<Notify>,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    /// Create a new mock encoder.
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Create a mock encoder reporting `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encodes: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            duration_ms: Arc::new(RwLock::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            started: Arc::new(AtomicUsize::new(0)),
            started_notify: Arc::new(Notify::new()),
            paused: Arc::new(AtomicBool::new(false)),
            resume_notify: Arc::new(Notify::new()),
        }
    }

    /// Get all recorded encode calls, in completion order.
    pub async fn recorded_encodes(&self) -> Vec<RecordedEncode> {
        self.encodes.read().await.clone()
    }

    /// Get the number of completed encode calls.
    pub async fn encode_count(&self) -> usize {
        self.encodes.read().await.len()
    }

    /// Make every encode of `file_name` fail.
    pub async fn fail_file(&self, file_name: impl Into<String>) {
        self.failing.write().await.insert(file_name.into());
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: EncoderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated encode duration.
    pub async fn set_duration(&self, duration: Duration) {
        *self.duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Most calls that were ever running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Calls started so far, finished or not.
    pub fn started_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Hold new and running calls until `resume`.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.resume_notify.notify_waiters();
    }

    /// Wait until at least `count` calls have started.
    pub async fn wait_for_started(&self, count: usize) {
        loop {
            let notified = self.started_notify.notified();
            if self.started_count() >= count {
                return;
            }
            notified.await;
        }
    }

    async fn wait_while_paused(&self) {
        loop {
            let notified = self.resume_notify.notified();
            if !self.paused.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }

    async fn outcome(&self, request: &EncodeRequest) -> Result<EncodedOutput, EncoderError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if self.failing.read().await.contains(&request.file_name) {
            return Err(EncoderError::encode_failed(format!(
                "mock failure for {}",
                request.file_name
            )));
        }
        Ok(EncodedOutput {
            file_name: request.output_name("converted_", request.target.as_str()),
            media_type: format!("application/x-{}", request.target),
            bytes: request.payload.to_vec(),
        })
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn convert(&self, request: EncodeRequest) -> Result<EncodedOutput, EncoderError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        self.started.fetch_add(1, Ordering::SeqCst);
        self.started_notify.notify_waiters();

        self.wait_while_paused().await;

        let duration_ms = *self.duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }

        let result = self.outcome(&request).await;

        self.encodes.write().await.push(RecordedEncode {
            file_name: request.file_name.clone(),
            target: request.target.clone(),
            success: result.is_ok(),
        });
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        result
    }
}
