use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use futures::FutureExt;
use tokio::sync::Mutex;
use super::dedup::{self, DedupKey};
use super::errors::{GpError, Result};
use super::task::{FileTask, TaskState};
use super::traits::{EventSink, PhotosApi};
use super::types::{BatchSummary, FileOutcome, UploadEvent, UploadOptions, WorkerState};

/// Files not yet claimed by any worker
pub(crate) type Backlog = Arc<Mutex<VecDeque<FileTask>>>;

pub(crate) struct UploadWorker {
    pub(crate) id: usize,
    pub(crate) api: Arc<dyn PhotosApi>,
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) options: UploadOptions,
}

impl UploadWorker {
    /// Drain the backlog until it is empty. Each `pop_front` hands a task to
    /// exactly one worker.
    pub(crate) async fn run(self, backlog: Backlog, summary: Arc<Mutex<BatchSummary>>) {
        tracing::debug!(worker_id = self.id, "worker started");

        loop {
            let next = backlog.lock().await.pop_front();
            let Some(mut task) = next else {
                break;
            };

            task.start();
            // A panic in one file's processing fails that file only
            let (outcome, media_key) = match AssertUnwindSafe(self.process(&task)).catch_unwind().await {
                Ok(Ok(result)) => result,
                Ok(Err(err)) => (FileOutcome::Failed(err.to_string()), None),
                Err(panic) => {
                    let message = panic_message(&*panic);
                    tracing::error!(worker_id = self.id, path = %task.path.display(), %message, "file processing panicked");
                    (FileOutcome::Failed(format!("processing panicked: {message}")), None)
                }
            };

            if self.options.delete_source && outcome.is_success() {
                self.set_status(WorkerState::Deleting, &task.name);
                // The upload outcome stands even if the local copy survives
                if let Err(err) = tokio::fs::remove_file(&task.path).await {
                    tracing::warn!(path = %task.path.display(), error = %err, "failed to delete source file");
                }
            }

            task.finish(outcome, media_key);
            self.record(task, &summary).await;
        }

        self.set_status(WorkerState::Idle, "");
        tracing::debug!(worker_id = self.id, "worker finished");
    }

    async fn process(&self, task: &FileTask) -> Result<(FileOutcome, Option<String>)> {
        self.set_status(WorkerState::Hashing, &task.name);
        let path = task.path.clone();
        let digest = tokio::task::spawn_blocking(move || dedup::sha1_file(&path))
            .await
            .map_err(|err| GpError::transfer(format!("hashing task failed: {err}")))??;
        let key = DedupKey::from_digest(&digest);

        if !self.options.force_upload {
            self.set_status(WorkerState::Checking, &task.name);
            if let Some(media_key) = self.api.find_by_dedup_key(&key).await? {
                return Ok((FileOutcome::Existing, Some(media_key)));
            }
        }

        self.set_status(WorkerState::Uploading, &task.name);
        let media_key = self.api.upload_file(&task.path, &key).await?;
        Ok((FileOutcome::Uploaded, Some(media_key)))
    }

    async fn record(&self, task: FileTask, summary: &Mutex<BatchSummary>) {
        let FileTask { path, size, state, media_key, .. } = task;
        let outcome = match state {
            TaskState::Done(outcome) => outcome,
            // finish() always runs first
            _ => FileOutcome::Failed("task did not complete".to_string()),
        };

        let mut summary = summary.lock().await;
        match &outcome {
            FileOutcome::Uploaded => {
                summary.uploaded += 1;
                summary.bytes_uploaded += size;
            }
            FileOutcome::Existing => summary.existing += 1,
            FileOutcome::Failed(reason) => {
                summary.failed += 1;
                tracing::debug!(path = %path.display(), reason = %reason, "file failed");
            }
        }

        self.sink.emit(UploadEvent::FileStatus {
            path,
            outcome,
            media_key,
        });
    }

    fn set_status(&self, status: WorkerState, file_name: &str) {
        self.sink.emit(UploadEvent::WorkerStatus {
            worker_id: self.id,
            status,
            file_name: file_name.to_string(),
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
