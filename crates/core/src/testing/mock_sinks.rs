//! Recording sinks for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, RwLock};

use crate::encoder::EncodedOutput;
use crate::sink::{DownloadSink, Preview, PreviewSink, SinkError};

/// Download sink that keeps every output it is given.
///
/// Can be paused so a trigger stays in progress until `resume`.
#[derive(Debug, Clone, Default)]
pub struct RecordingDownloadSink {
    delivered: Arc<RwLock<Vec<EncodedOutput>>>,
    fail: Arc<RwLock<bool>>,
    triggered: Arc<AtomicUsize>,
    triggered_notify: Arc<Notify>,
    paused: Arc<AtomicBool>,
    resume_notify: Arc<Notify>,
}

impl RecordingDownloadSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all delivered outputs, in order.
    pub async fn delivered(&self) -> Vec<EncodedOutput> {
        self.delivered.read().await.clone()
    }

    /// Get the names of all delivered outputs, in order.
    pub async fn delivered_names(&self) -> Vec<String> {
        self.delivered
            .read()
            .await
            .iter()
            .map(|o| o.file_name.clone())
            .collect()
    }

    /// Make every trigger fail while set.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    /// Hold new and running triggers until `resume`.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.resume_notify.notify_waiters();
    }

    /// Wait until at least `count` triggers have started.
    pub async fn wait_for_triggered(&self, count: usize) {
        loop {
            let notified = self.triggered_notify.notified();
            if self.triggered.load(Ordering::SeqCst) >= count {
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
}

#[async_trait]
impl DownloadSink for RecordingDownloadSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn trigger(&self, output: EncodedOutput) -> Result<(), SinkError> {
        self.triggered.fetch_add(1, Ordering::SeqCst);
        self.triggered_notify.notify_waiters();
        self.wait_while_paused().await;

        if *self.fail.read().await {
            return Err(SinkError::rejected("mock download failure"));
        }
        self.delivered.write().await.push(output);
        Ok(())
    }
}

/// Preview sink that keeps every preview it is shown.
#[derive(Debug, Clone, Default)]
pub struct RecordingPreviewSink {
    previews: Arc<Mutex<Vec<Preview>>>,
}

impl RecordingPreviewSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all previews, in order.
    pub fn previews(&self) -> Vec<Preview> {
        match self.previews.lock() {
            Ok(previews) => previews.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PreviewSink for RecordingPreviewSink {
    fn show(&self, preview: Preview) {
        match self.previews.lock() {
            Ok(mut previews) => previews.push(preview),
            Err(poisoned) => poisoned.into_inner().push(preview),
        }
    }
}
