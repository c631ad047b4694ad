//! Batch lifecycle integration tests.
//!
//! These tests drive the batch pipeline with mock source, encoder and sinks:
//! - Ingest progress and previews
//! - Format choice validation
//! - Ordering and single-flight conversion
//! - Per-item failure containment
//! - Superseding a running batch

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use batchconv_core::{
    catalog::FormatCatalog,
    config::Config,
    media::{MediaKind, SourceFile},
    pipeline::{BatchPipeline, BatchState, PipelineError, PipelineEvent, COMPLETION_MESSAGE},
    testing::{
        fixtures, MockEncoder, MockFileSource, RecordingDownloadSink, RecordingPreviewSink,
    },
};

/// Test helper wiring a pipeline to mock collaborators.
struct TestHarness {
    pipeline: BatchPipeline,
    source: MockFileSource,
    encoder: MockEncoder,
    downloads: RecordingDownloadSink,
    previews: RecordingPreviewSink,
    events: mpsc::Receiver<PipelineEvent>,
}

impl TestHarness {
    fn new() -> Self {
        init_tracing();

        let source = MockFileSource::new();
        let encoder = MockEncoder::new();
        let downloads = RecordingDownloadSink::new();
        let previews = RecordingPreviewSink::new();
        let (tx, events) = mpsc::channel(1024);

        let catalog = FormatCatalog::builder()
            .all(Arc::new(encoder.clone()))
            .build();

        let pipeline = BatchPipeline::new(
            &Config::default(),
            Arc::new(source.clone()),
            Arc::new(downloads.clone()),
        )
        .with_catalog(catalog)
        .with_preview_sink(Arc::new(previews.clone()))
        .with_events(tx);

        Self {
            pipeline,
            source,
            encoder,
            downloads,
            previews,
            events,
        }
    }

    /// Registers a text file with the source and returns its entry.
    async fn text_file(&self, name: &str, text: &str) -> SourceFile {
        self.source.set_contents(name, text.as_bytes().to_vec()).await;
        fixtures::text_file(name, text)
    }

    async fn file(&self, name: &str, media_type: &str, bytes: Vec<u8>) -> SourceFile {
        let file = fixtures::virtual_file(name, media_type, bytes.len() as u64);
        self.source.set_contents(name, bytes).await;
        file
    }

    /// Events received so far.
    fn drain_events(&mut self) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    async fn history_messages(&self) -> Vec<String> {
        self.pipeline
            .history()
            .lines()
            .await
            .into_iter()
            .map(|line| line.message)
            .collect()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("batchconv_core=debug")
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Ingest Tests
// =============================================================================

#[tokio::test]
async fn test_ingest_reaches_full_progress() {
    let harness = TestHarness::new();
    let files = vec![
        harness.text_file("a.txt", "first file, long enough for chunks").await,
        harness.text_file("b.txt", "second").await,
        harness.text_file("c.txt", "").await,
    ];

    let mut job = harness.pipeline.submit(files).await.unwrap();
    assert_eq!(harness.pipeline.progress().await.ingest_percent, 0);

    let formats = harness.pipeline.ingest(&mut job).await.unwrap();

    assert_eq!(formats.len(), 1);
    assert_eq!(formats[0].as_str(), "pdf");
    assert_eq!(job.state(), BatchState::AwaitingFormatChoice);

    let progress = harness.pipeline.progress().await;
    assert_eq!(progress.ingest_percent, 100);
    assert_eq!(progress.ingest_loaded_bytes, progress.ingest_total_bytes);
}

#[tokio::test]
async fn test_ingest_credits_underreported_sizes() {
    let harness = TestHarness::new();
    // Declared size larger than the payload the source serves.
    harness.source.set_contents("short.txt", b"abc".to_vec()).await;
    let file = fixtures::virtual_file("short.txt", "text/plain", 1000);

    let mut job = harness.pipeline.submit(vec![file]).await.unwrap();
    harness.pipeline.ingest(&mut job).await.unwrap();

    assert_eq!(harness.pipeline.progress().await.ingest_percent, 100);
}

#[tokio::test]
async fn test_ingest_shows_one_preview_per_file() {
    let harness = TestHarness::new();
    let files = vec![
        harness.file("photo.png", "image/png", fixtures::png_bytes(300, 200)).await,
        harness.text_file("notes.txt", "hello").await,
    ];

    let mut job = harness.pipeline.submit(files).await.unwrap();
    harness.pipeline.ingest(&mut job).await.unwrap();

    // Previews arrive in completion order.
    let previews = harness.previews.previews();
    assert_eq!(previews.len(), 2);
    let photo = previews.iter().find(|p| p.file_name == "photo.png").unwrap();
    assert_eq!(photo.kind, MediaKind::Image);
    assert!(photo.thumbnail.is_some());
    let notes = previews.iter().find(|p| p.file_name == "notes.txt").unwrap();
    assert_eq!(notes.kind, MediaKind::PlainText);
    assert!(notes.thumbnail.is_none());
}

#[tokio::test]
async fn test_preview_shown_when_its_read_finishes() {
    let harness = TestHarness::new();
    harness.source.hold("slow.txt").await;
    let files = vec![
        harness.text_file("slow.txt", "still loading").await,
        harness.text_file("fast.txt", "done").await,
    ];

    let mut job = harness.pipeline.submit(files).await.unwrap();
    let ingest = {
        let pipeline = harness.pipeline.clone();
        tokio::spawn(async move {
            let result = pipeline.ingest(&mut job).await;
            (result, job)
        })
    };

    tokio::time::timeout(Duration::from_secs(5), async {
        while harness.previews.previews().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("preview of the finished file");

    let names: Vec<_> = harness
        .previews
        .previews()
        .into_iter()
        .map(|p| p.file_name)
        .collect();
    assert_eq!(names, vec!["fast.txt"]);
    assert!(!ingest.is_finished());

    harness.source.release("slow.txt").await;
    let (result, job) = ingest.await.unwrap();
    result.unwrap();

    let names: Vec<_> = harness
        .previews
        .previews()
        .into_iter()
        .map(|p| p.file_name)
        .collect();
    assert_eq!(names, vec!["fast.txt", "slow.txt"]);
    let order: Vec<_> = job.files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(order, vec!["slow.txt", "fast.txt"]);
    assert_eq!(job.state(), BatchState::AwaitingFormatChoice);
}

#[tokio::test]
async fn test_ingest_progress_never_goes_backwards() {
    let mut harness = TestHarness::new();
    let files = vec![
        harness.text_file("a.txt", &"a".repeat(37)).await,
        harness.text_file("b.txt", &"b".repeat(50)).await,
        harness.text_file("c.txt", &"c".repeat(23)).await,
    ];

    let mut job = harness.pipeline.submit(files).await.unwrap();
    harness.pipeline.ingest(&mut job).await.unwrap();

    let progress: Vec<(u64, u64, u8)> = harness
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            PipelineEvent::IngestProgress {
                loaded_bytes,
                total_bytes,
                percent,
                ..
            } => Some((loaded_bytes, total_bytes, percent)),
            _ => None,
        })
        .collect();

    // 4 byte chunks across three files.
    assert!(progress.len() >= 28);
    assert!(progress.iter().all(|&(_, total, _)| total == 110));
    assert!(progress
        .windows(2)
        .all(|w| w[0].0 <= w[1].0 && w[0].2 <= w[1].2));
    assert_eq!(progress.last(), Some(&(110, 110, 100)));
}

#[tokio::test]
async fn test_first_file_decides_offered_formats() {
    let harness = TestHarness::new();
    let files = vec![
        harness.file("photo.png", "image/png", fixtures::png_bytes(4, 4)).await,
        harness.text_file("notes.txt", "hello").await,
    ];

    let mut job = harness.pipeline.submit(files).await.unwrap();
    let formats = harness.pipeline.ingest(&mut job).await.unwrap();

    let names: Vec<_> = formats.iter().map(|f| f.as_str()).collect();
    assert_eq!(names, vec!["png", "jpeg", "bmp", "gif", "tiff", "webp"]);
    assert_eq!(job.governing_kind(), Some(MediaKind::Image));
}

#[tokio::test]
async fn test_unreadable_file_is_dropped_from_batch() {
    let harness = TestHarness::new();
    let a = harness.text_file("a.txt", "hello").await;
    let b = fixtures::virtual_file("b.txt", "text/plain", 20);
    harness.source.fail_read("b.txt", "permission denied").await;
    let c = harness.text_file("c.txt", "world").await;

    let mut job = harness.pipeline.submit(vec![a, b, c]).await.unwrap();
    harness.pipeline.ingest(&mut job).await.unwrap();

    let names: Vec<_> = job.files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "c.txt"]);
    assert_eq!(job.unreadable(), ["b.txt".to_string()]);
    assert_eq!(harness.pipeline.progress().await.ingest_percent, 100);
    assert!(harness
        .history_messages()
        .await
        .contains(&"Failed to read b.txt: permission denied".to_string()));

    let outcome = harness.pipeline.choose_format(&mut job, "pdf").await.unwrap();
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(harness.pipeline.history().entries().await, vec!["a.txt", "c.txt"]);
}

#[tokio::test]
async fn test_all_reads_failing_ends_the_batch() {
    let harness = TestHarness::new();
    harness.source.fail_read("a.txt", "gone").await;
    let file = fixtures::virtual_file("a.txt", "text/plain", 5);

    let mut job = harness.pipeline.submit(vec![file]).await.unwrap();
    let err = harness.pipeline.ingest(&mut job).await.unwrap_err();

    assert_eq!(err, PipelineError::EmptyBatch);
    assert_eq!(job.state(), BatchState::Completed);
    assert_eq!(harness.encoder.encode_count().await, 0);
}

// =============================================================================
// Format Choice Tests
// =============================================================================

#[tokio::test]
async fn test_empty_format_is_rejected_and_job_unchanged() {
    let harness = TestHarness::new();
    let file = harness.text_file("a.txt", "hello").await;

    let mut job = harness.pipeline.submit(vec![file]).await.unwrap();
    harness.pipeline.ingest(&mut job).await.unwrap();

    let err = harness.pipeline.choose_format(&mut job, "").await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidFormat { .. }));

    assert_eq!(job.state(), BatchState::AwaitingFormatChoice);
    assert_eq!(job.cursor(), 0);
    assert!(job.target().is_none());
    assert_eq!(harness.encoder.encode_count().await, 0);
    assert_eq!(harness.pipeline.progress().await.items_total, 0);
}

// =============================================================================
// Conversion Tests
// =============================================================================

#[tokio::test]
async fn test_history_follows_submission_order() {
    let harness = TestHarness::new();
    harness.encoder.fail_file("b.txt").await;
    let files = vec![
        harness.text_file("a.txt", "a").await,
        harness.text_file("b.txt", "b").await,
        harness.text_file("c.txt", "c").await,
        harness.text_file("d.txt", "d").await,
    ];

    let mut job = harness.pipeline.submit(files).await.unwrap();
    harness.pipeline.ingest(&mut job).await.unwrap();
    let outcome = harness.pipeline.choose_format(&mut job, "pdf").await.unwrap();

    assert_eq!(outcome.succeeded, 3);
    assert_eq!(outcome.failed, 1);

    let recorded: Vec<_> = harness
        .encoder
        .recorded_encodes()
        .await
        .into_iter()
        .map(|e| e.file_name)
        .collect();
    assert_eq!(recorded, vec!["a.txt", "b.txt", "c.txt", "d.txt"]);

    let messages = harness.history_messages().await;
    let per_item: Vec<_> = messages
        .iter()
        .filter(|m| m.starts_with("Converted:") || m.starts_with("Conversion failed:"))
        .cloned()
        .collect();
    assert_eq!(
        per_item,
        vec![
            "Converted: a.txt",
            "Conversion failed: Error processing b.txt: Failed to encode output: mock failure for b.txt",
            "Converted: c.txt",
            "Converted: d.txt",
        ]
    );

    assert_eq!(
        harness.downloads.delivered_names().await,
        vec!["converted_a.pdf", "converted_c.pdf", "converted_d.pdf"]
    );
}

#[tokio::test]
async fn test_only_one_conversion_in_flight() {
    let harness = TestHarness::new();
    harness.encoder.set_duration(Duration::from_millis(5)).await;
    let mut files = Vec::new();
    for i in 0..6 {
        files.push(harness.text_file(&format!("f{}.txt", i), "payload").await);
    }

    let mut job = harness.pipeline.submit(files).await.unwrap();
    harness.pipeline.ingest(&mut job).await.unwrap();
    harness.pipeline.choose_format(&mut job, "pdf").await.unwrap();

    assert_eq!(harness.encoder.encode_count().await, 6);
    assert_eq!(harness.encoder.max_in_flight(), 1);
}

#[tokio::test]
async fn test_single_failing_file_still_completes() {
    let harness = TestHarness::new();
    harness.encoder.fail_file("broken.txt").await;
    let file = harness.text_file("broken.txt", "data").await;

    let mut job = harness.pipeline.submit(vec![file]).await.unwrap();
    harness.pipeline.ingest(&mut job).await.unwrap();
    let outcome = harness.pipeline.choose_format(&mut job, "pdf").await.unwrap();

    assert_eq!(job.state(), BatchState::Completed);
    assert_eq!(outcome.message, COMPLETION_MESSAGE);
    assert_eq!(outcome.failed, 1);
    assert_eq!(harness.pipeline.progress().await.convert_percent, 100);

    let messages = harness.history_messages().await;
    assert_eq!(
        messages
            .iter()
            .filter(|m| m.starts_with("Conversion failed:"))
            .count(),
        1
    );
    assert!(!messages.iter().any(|m| m.starts_with("Converted:")));
    assert!(harness.pipeline.history().entries().await.is_empty());
}

#[tokio::test]
async fn test_events_describe_the_batch() {
    let mut harness = TestHarness::new();
    harness.encoder.fail_file("b.txt").await;
    let files = vec![
        harness.text_file("a.txt", "hello").await,
        harness.text_file("b.txt", "world").await,
    ];

    let mut job = harness.pipeline.submit(files).await.unwrap();
    harness.pipeline.ingest(&mut job).await.unwrap();
    harness.pipeline.choose_format(&mut job, "pdf").await.unwrap();

    let events: Vec<_> = harness
        .drain_events()
        .into_iter()
        .filter(|e| !matches!(e, PipelineEvent::IngestProgress { .. }))
        .collect();

    assert!(events.iter().all(|e| e.job_id() == job.id()));
    assert!(matches!(events[0], PipelineEvent::Submitted { files: 2, .. }));
    assert!(matches!(events[1], PipelineEvent::FileIngested { ref file, .. } if file == "a.txt"));
    assert!(matches!(events[2], PipelineEvent::FileIngested { ref file, .. } if file == "b.txt"));
    assert!(matches!(events[3], PipelineEvent::AwaitingFormat { .. }));
    assert!(matches!(events[4], PipelineEvent::Converting { index: 0, total: 2, .. }));
    assert!(matches!(events[5], PipelineEvent::ItemConverted { percent: 50, .. }));
    assert!(matches!(events[6], PipelineEvent::Converting { index: 1, .. }));
    assert!(matches!(events[7], PipelineEvent::ItemFailed { percent: 100, .. }));
    match &events[8] {
        PipelineEvent::Completed {
            succeeded,
            failed,
            message,
            ..
        } => {
            assert_eq!((*succeeded, *failed), (1, 1));
            assert_eq!(message, COMPLETION_MESSAGE);
        }
        other => panic!("expected completion, got {:?}", other),
    }
}

// =============================================================================
// Superseding Tests
// =============================================================================

#[tokio::test]
async fn test_resubmit_while_converting_supersedes_old_batch() {
    let harness = TestHarness::new();
    let first = vec![
        harness.text_file("old1.txt", "one").await,
        harness.text_file("old2.txt", "two").await,
        harness.text_file("old3.txt", "three").await,
    ];

    let mut old_job = harness.pipeline.submit(first).await.unwrap();
    harness.pipeline.ingest(&mut old_job).await.unwrap();

    harness.encoder.pause();
    let old_task = {
        let pipeline = harness.pipeline.clone();
        tokio::spawn(async move {
            let result = pipeline.choose_format(&mut old_job, "pdf").await;
            (result, old_job)
        })
    };
    harness.encoder.wait_for_started(1).await;

    let new_file = harness.text_file("new.txt", "fresh batch").await;
    let mut new_job = harness.pipeline.submit(vec![new_file]).await.unwrap();

    let progress = harness.pipeline.progress().await;
    assert_eq!(progress.ingest_total_bytes, "fresh batch".len() as u64);
    assert_eq!(progress.items_total, 0);
    assert_eq!(progress.convert_percent, 0);
    assert_eq!(harness.pipeline.active_job().await, Some(new_job.id()));

    harness.pipeline.ingest(&mut new_job).await.unwrap();
    let new_task = {
        let pipeline = harness.pipeline.clone();
        tokio::spawn(async move { pipeline.choose_format(&mut new_job, "pdf").await })
    };

    harness.encoder.resume();

    let (old_result, old_job) = old_task.await.unwrap();
    assert!(matches!(old_result, Err(PipelineError::Superseded { .. })));
    assert_eq!(old_job.cursor(), 0);

    let outcome = new_task.await.unwrap().unwrap();
    assert_eq!(outcome.succeeded, 1);

    assert_eq!(harness.pipeline.history().entries().await, vec!["new.txt"]);
    assert_eq!(
        harness.downloads.delivered_names().await,
        vec!["converted_new.pdf"]
    );
    assert_eq!(harness.encoder.max_in_flight(), 1);

    let progress = harness.pipeline.progress().await;
    assert_eq!(progress.items_total, 1);
    assert_eq!(progress.convert_percent, 100);
}

#[tokio::test]
async fn test_resubmit_during_download_waits_for_the_item_to_be_recorded() {
    let harness = TestHarness::new();
    let files = vec![
        harness.text_file("a.txt", "first").await,
        harness.text_file("b.txt", "second").await,
    ];

    let mut old_job = harness.pipeline.submit(files).await.unwrap();
    harness.pipeline.ingest(&mut old_job).await.unwrap();

    harness.downloads.pause();
    let old_task = {
        let pipeline = harness.pipeline.clone();
        tokio::spawn(async move { pipeline.choose_format(&mut old_job, "pdf").await })
    };
    harness.downloads.wait_for_triggered(1).await;

    let new_file = harness.text_file("new.txt", "fresh").await;
    let submit_task = {
        let pipeline = harness.pipeline.clone();
        tokio::spawn(async move { pipeline.submit(vec![new_file]).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!submit_task.is_finished());

    harness.downloads.resume();
    let new_job = submit_task.await.unwrap().unwrap();
    let old_result = old_task.await.unwrap();
    assert!(matches!(old_result, Err(PipelineError::Superseded { .. })));

    // The item in flight is delivered and recorded before the new batch
    // starts; nothing after it is.
    assert_eq!(
        harness.downloads.delivered_names().await,
        vec!["converted_a.pdf"]
    );
    assert_eq!(harness.pipeline.history().entries().await, vec!["a.txt"]);
    let messages = harness.history_messages().await;
    assert_eq!(
        &messages[messages.len() - 2..],
        ["Converted: a.txt", "Starting conversion..."]
    );
    assert_eq!(harness.pipeline.active_job().await, Some(new_job.id()));
}

#[tokio::test]
async fn test_superseded_job_cannot_continue() {
    let harness = TestHarness::new();
    let a = harness.text_file("a.txt", "a").await;
    let b = harness.text_file("b.txt", "b").await;

    let mut first = harness.pipeline.submit(vec![a]).await.unwrap();
    let _second = harness.pipeline.submit(vec![b]).await.unwrap();

    let err = harness.pipeline.ingest(&mut first).await.unwrap_err();
    assert_eq!(err, PipelineError::Superseded { job_id: first.id() });
    assert!(harness.source.recorded_reads().await.is_empty());
}
