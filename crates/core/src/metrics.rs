//! Prometheus metrics for the conversion pipeline.
//!
//! This module provides metrics for:
//! - Batches (submitted, completed, superseded)
//! - Conversions per media kind (results, durations)
//! - Ingest (bytes read, read failures)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Batch Metrics
// =============================================================================

/// Batches submitted.
pub static BATCHES_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("batchconv_batches_submitted_total", "Total batches submitted").unwrap()
});

/// Batches finished by result.
pub static BATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("batchconv_batches_total", "Total batches finished"),
        &["result"], // "completed", "superseded", "empty"
    )
    .unwrap()
});

// =============================================================================
// Conversion Metrics
// =============================================================================

/// Conversions total by kind and result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("batchconv_conversions_total", "Total file conversions"),
        &["kind", "result"], // result: "success", "failed", "unsupported"
    )
    .unwrap()
});

/// Conversion duration in seconds, encoder plus download.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "batchconv_conversion_duration_seconds",
            "Duration of single file conversions",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["kind"],
    )
    .unwrap()
});

// =============================================================================
// Ingest Metrics
// =============================================================================

/// Bytes read from file sources.
pub static INGEST_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("batchconv_ingest_bytes_total", "Total bytes ingested").unwrap()
});

/// Source reads that failed.
pub static READ_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("batchconv_read_failures_total", "Total failed source reads").unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Batches
        Box::new(BATCHES_SUBMITTED.clone()),
        Box::new(BATCHES_TOTAL.clone()),
        // Conversions
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        // Ingest
        Box::new(INGEST_BYTES.clone()),
        Box::new(READ_FAILURES.clone()),
    ]
}
