//! Mock file source for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify, RwLock};

use crate::media::SourceFile;
use crate::source::{FileSource, SourceError};

/// Mock implementation of the FileSource trait.
///
/// Serves payloads registered by file name, in chunks, yielding between
/// chunks so concurrent reads interleave. Unregistered names read as
/// not found. Reads of held names wait until they are released.
#[derive(Debug, Clone)]
pub struct MockFileSource {
    contents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    failures: Arc<RwLock<HashMap<String, String>>>,
    /// Names in the order reads started.
    reads: Arc<RwLock<Vec<String>>>,
    held: Arc<RwLock<HashSet<String>>>,
    release_notify: Arc<Notify>,
    chunk_size: usize,
}

impl Default for MockFileSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSource {
    /// Create a new mock source with 4 byte chunks.
    pub fn new() -> Self {
        Self::with_chunk_size(4)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            contents: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            reads: Arc::new(RwLock::new(Vec::new())),
            held: Arc::new(RwLock::new(HashSet::new())),
            release_notify: Arc::new(Notify::new()),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Register the payload served for `name`.
    pub async fn set_contents(&self, name: impl Into<String>, bytes: Vec<u8>) {
        self.contents.write().await.insert(name.into(), bytes);
    }

    /// Make reads of `name` fail with `reason`.
    pub async fn fail_read(&self, name: impl Into<String>, reason: impl Into<String>) {
        self.failures.write().await.insert(name.into(), reason.into());
    }

    /// Hold reads of `name` until `release` is called for it.
    pub async fn hold(&self, name: impl Into<String>) {
        self.held.write().await.insert(name.into());
    }

    pub async fn release(&self, name: &str) {
        self.held.write().await.remove(name);
        self.release_notify.notify_waiters();
    }

    async fn wait_while_held(&self, name: &str) {
        loop {
            let notified = self.release_notify.notified();
            if !self.held.read().await.contains(name) {
                return;
            }
            notified.await;
        }
    }

    /// Get the names of all reads, in start order.
    pub async fn recorded_reads(&self) -> Vec<String> {
        self.reads.read().await.clone()
    }
}

#[async_trait]
impl FileSource for MockFileSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn read(
        &self,
        file: &SourceFile,
        progress: mpsc::Sender<u64>,
    ) -> Result<Vec<u8>, SourceError> {
        self.reads.write().await.push(file.name.clone());
        self.wait_while_held(&file.name).await;

        if let Some(reason) = self.failures.read().await.get(&file.name) {
            return Err(SourceError::read_failed(&file.name, reason));
        }

        let bytes = self
            .contents
            .read()
            .await
            .get(&file.name)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                path: file.path.clone(),
            })?;

        for chunk in bytes.chunks(self.chunk_size) {
            let _ = progress.send(chunk.len() as u64).await;
            tokio::task::yield_now().await;
        }

        Ok(bytes)
    }
}
