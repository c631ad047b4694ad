use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One timestamped log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogLine {
    fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

/// Renders as `[HH:MM:SS] message` in local time.
impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local = self.timestamp.with_timezone(&Local);
        write!(f, "[{}] {}", local.format("%H:%M:%S"), self.message)
    }
}

/// Everything recorded so far, as exported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub entries: Vec<String>,
    pub lines: Vec<LogLine>,
}

/// Shared history of converted file names plus a text log.
///
/// This is cheaply cloneable; all clones append to the same log. Nothing is
/// ever removed or reordered.
#[derive(Clone, Default)]
pub struct HistoryLog {
    inner: Arc<RwLock<HistorySnapshot>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a converted file name. Duplicates are kept.
    pub async fn record(&self, file_name: impl Into<String>) {
        self.inner.write().await.entries.push(file_name.into());
    }

    /// Appends a failure line for `file_name`. History entries are untouched.
    pub async fn record_failure(&self, file_name: &str, reason: &str) {
        self.line(format!(
            "Conversion failed: Error processing {}: {}",
            file_name, reason
        ))
        .await;
    }

    /// Appends a timestamped line.
    pub async fn line(&self, message: impl Into<String>) {
        self.inner.write().await.lines.push(LogLine::now(message));
    }

    pub async fn entries(&self) -> Vec<String> {
        self.inner.read().await.entries.clone()
    }

    pub async fn lines(&self) -> Vec<LogLine> {
        self.inner.read().await.lines.clone()
    }

    /// Lines rendered for display.
    pub async fn rendered_lines(&self) -> Vec<String> {
        self.inner
            .read()
            .await
            .lines
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub async fn snapshot(&self) -> HistorySnapshot {
        self.inner.read().await.clone()
    }

    /// Exports entries and lines as pretty-printed JSON.
    pub async fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&*self.inner.read().await)
    }
}

impl fmt::Debug for HistoryLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryLog").finish_non_exhaustive()
    }
}
