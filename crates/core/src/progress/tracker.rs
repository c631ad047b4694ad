use serde::{Deserialize, Serialize};

/// Byte progress while ingesting, item progress while converting.
///
/// Both counters only move forward within a batch and are clamped to their
/// totals. A new batch starts from [`ProgressTracker::reset`] or
/// [`ProgressTracker::begin_ingest`].
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    ingest: Option<Counter>,
    convert: Option<Counter>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counter {
    done: u64,
    total: u64,
}

impl Counter {
    fn new(total: u64) -> Self {
        Self { done: 0, total }
    }

    fn advance(&mut self, delta: u64) {
        self.done = self.done.saturating_add(delta).min(self.total);
    }

    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.done as f64 / self.total as f64) * 100.0).round() as u8
    }
}

/// Serializable view of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub ingest_loaded_bytes: u64,
    pub ingest_total_bytes: u64,
    pub ingest_percent: u8,
    pub items_completed: u64,
    pub items_total: u64,
    pub convert_percent: u8,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts byte tracking for a new batch, discarding all prior progress.
    pub fn begin_ingest(&mut self, total_bytes: u64) {
        self.ingest = Some(Counter::new(total_bytes));
        self.convert = None;
    }

    /// Adds loaded bytes. Ignored before `begin_ingest`.
    pub fn on_bytes_loaded(&mut self, delta: u64) {
        if let Some(counter) = self.ingest.as_mut() {
            counter.advance(delta);
        }
    }

    /// Ingest progress, 0..=100. A zero-byte batch reads as 100 once begun.
    pub fn ingest_percent(&self) -> u8 {
        self.ingest.map(|c| c.percent()).unwrap_or(0)
    }

    /// Starts item tracking; leaves ingest progress as it is.
    pub fn begin_convert(&mut self, total_items: usize) {
        self.convert = Some(Counter::new(total_items as u64));
    }

    /// Marks one item done, successful or not.
    pub fn on_item_done(&mut self) {
        if let Some(counter) = self.convert.as_mut() {
            counter.advance(1);
        }
    }

    /// Conversion progress, 0..=100.
    pub fn convert_percent(&self) -> u8 {
        self.convert.map(|c| c.percent()).unwrap_or(0)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let ingest = self.ingest.unwrap_or_default();
        let convert = self.convert.unwrap_or_default();
        ProgressSnapshot {
            ingest_loaded_bytes: ingest.done,
            ingest_total_bytes: ingest.total,
            ingest_percent: self.ingest_percent(),
            items_completed: convert.done,
            items_total: convert.total,
            convert_percent: self.convert_percent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_tracker_is_zero() {
        let tracker = ProgressTracker::new();
        assert_eq!(tracker.ingest_percent(), 0);
        assert_eq!(tracker.convert_percent(), 0);
    }

    #[test]
    fn test_ingest_percent_rounds() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_ingest(3);
        tracker.on_bytes_loaded(1);
        assert_eq!(tracker.ingest_percent(), 33);
        tracker.on_bytes_loaded(1);
        assert_eq!(tracker.ingest_percent(), 67);
    }

    #[test]
    fn test_ingest_is_clamped_to_total() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_ingest(100);
        tracker.on_bytes_loaded(80);
        tracker.on_bytes_loaded(80);
        assert_eq!(tracker.ingest_percent(), 100);
        assert_eq!(tracker.snapshot().ingest_loaded_bytes, 100);
    }

    #[test]
    fn test_zero_byte_batch_is_complete() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_ingest(0);
        assert_eq!(tracker.ingest_percent(), 100);
    }

    #[test]
    fn test_bytes_before_begin_are_ignored() {
        let mut tracker = ProgressTracker::new();
        tracker.on_bytes_loaded(50);
        tracker.begin_ingest(100);
        assert_eq!(tracker.ingest_percent(), 0);
    }

    #[test]
    fn test_convert_percent() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_convert(4);
        tracker.on_item_done();
        assert_eq!(tracker.convert_percent(), 25);
        for _ in 0..5 {
            tracker.on_item_done();
        }
        assert_eq!(tracker.convert_percent(), 100);
        assert_eq!(tracker.snapshot().items_completed, 4);
    }

    #[test]
    fn test_begin_ingest_discards_previous_batch() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_ingest(10);
        tracker.on_bytes_loaded(10);
        tracker.begin_convert(2);
        tracker.on_item_done();

        tracker.begin_ingest(50);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.ingest_loaded_bytes, 0);
        assert_eq!(snapshot.ingest_total_bytes, 50);
        assert_eq!(snapshot.items_total, 0);
        assert_eq!(snapshot.convert_percent, 0);
    }

    #[test]
    fn test_reset() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_ingest(10);
        tracker.on_bytes_loaded(5);
        tracker.reset();
        assert_eq!(tracker.snapshot(), ProgressTracker::new().snapshot());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_ingest(200);
        tracker.on_bytes_loaded(100);
        let json = serde_json::to_value(tracker.snapshot()).unwrap();
        assert_eq!(json["ingest_percent"], 50);
        assert_eq!(json["ingest_total_bytes"], 200);
    }
}
