use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use super::errors::{GpError, Result};

pub const DEFAULT_WORKERS: usize = 3;

/// Identifies one pipeline run in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct BatchId(Uuid);

impl BatchId {
    /// A fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Knobs for one `UploadManager::upload` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Walk the whole subtree instead of direct children only
    pub recursive: bool,

    /// Number of concurrent upload workers
    pub workers: usize,

    /// Upload even when the backend already has the content
    pub force_upload: bool,

    /// Remove the local file once it is uploaded or known to exist
    pub delete_source: bool,

    /// Accept every file instead of the supported media extensions only
    pub disable_filter: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            workers: DEFAULT_WORKERS,
            force_upload: false,
            delete_source: false,
            disable_filter: false,
        }
    }
}

impl UploadOptions {
    /// Reject option combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(GpError::InvalidOptions("worker count must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Terminal result of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Uploaded,
    Existing,
    Failed(String),
}

impl FileOutcome {
    /// Uploaded and existing files both count as success
    pub fn is_success(&self) -> bool {
        !matches!(self, FileOutcome::Failed(_))
    }
}

/// What a worker is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Hashing,
    Checking,
    Uploading,
    Deleting,
    Idle,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkerState::Hashing => "hashing",
            WorkerState::Checking => "checking",
            WorkerState::Uploading => "uploading",
            WorkerState::Deleting => "deleting",
            WorkerState::Idle => "idle",
        };
        f.write_str(s)
    }
}

/// Terminal counts for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub uploaded: usize,
    pub existing: usize,
    pub failed: usize,
    pub bytes_uploaded: u64,
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Uploaded plus existing
    pub fn succeeded(&self) -> usize {
        self.uploaded + self.existing
    }

    /// Files that reached any terminal outcome
    pub fn finished(&self) -> usize {
        self.uploaded + self.existing + self.failed
    }
}

/// Everything the pipeline reports while a batch runs
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// Discovery finished, workers are about to start
    BatchStart {
        total: usize,
    },

    /// A worker moved to another step of its current file
    WorkerStatus {
        worker_id: usize,
        status: WorkerState,
        file_name: String,
    },

    /// A file reached its terminal outcome
    FileStatus {
        path: PathBuf,
        outcome: FileOutcome,
        media_key: Option<String>,
    },

    /// Every file is accounted for; nothing follows this event
    BatchStop {
        summary: BatchSummary,
    },
}

/// Download location for a media item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadUrl {
    pub url: String,
    pub is_edited: bool,
}

/// Thumbnail size and format; unset dimensions use the backend default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub force_jpeg: bool,
    pub no_overlay: bool,
}

const _: () = {
    fn assert_send<T: Send>() {}
    fn assert_types() {
        assert_send::<UploadEvent>();
        assert_send::<BatchSummary>();
        assert_send::<UploadOptions>();
    }
};
