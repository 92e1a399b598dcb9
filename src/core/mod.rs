pub mod dedup;
mod discovery;
mod errors;
mod manager;
mod task;
mod traits;
mod types;
mod worker;

pub use dedup::{DedupKey, Digest};
pub use discovery::{discover, is_supported, SUPPORTED_EXTENSIONS};
pub use errors::{GpError, Result};
pub use manager::UploadManager;
pub use task::{FileTask, TaskState};
pub use traits::{ChannelSink, EventSink, PhotosApi};
pub use types::{
    BatchId,
    BatchSummary,
    DownloadUrl,
    FileOutcome,
    ThumbnailRequest,
    UploadEvent,
    UploadOptions,
    WorkerState,
    DEFAULT_WORKERS,
};
