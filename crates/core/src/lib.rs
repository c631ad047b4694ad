pub mod catalog;
pub mod config;
pub mod encoder;
pub mod history;
pub mod media;
pub mod metrics;
pub mod pipeline;
pub mod progress;
pub mod sink;
pub mod source;
pub mod testing;

pub use catalog::FormatCatalog;
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use encoder::{EncodeRequest, EncodedOutput, Encoder, EncoderError};
pub use history::{HistoryLog, LogLine};
pub use media::{MediaKind, SourceFile, TargetFormat};
pub use pipeline::{
    BatchJob, BatchOutcome, BatchPipeline, BatchState, PipelineError, PipelineEvent,
    COMPLETION_MESSAGE,
};
pub use progress::{ProgressSnapshot, ProgressTracker};
pub use sink::{DirectoryDownloadSink, DownloadSink, Preview, PreviewSink, SinkError};
pub use source::{FileSource, FsFileSource, SourceError};
