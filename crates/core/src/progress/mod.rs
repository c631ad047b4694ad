//! Ingest and conversion progress for the active batch.

mod tracker;

pub use tracker::{ProgressSnapshot, ProgressTracker};
