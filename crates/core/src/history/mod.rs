//! Append-only conversion history and timestamped log lines.

mod handle;

pub use handle::{HistoryLog, HistorySnapshot, LogLine};
