use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use futures::future::join_all;
use tokio::sync::Mutex;
use super::discovery::discover;
use super::errors::{GpError, Result};
use super::traits::{EventSink, PhotosApi};
use super::types::{BatchId, BatchSummary, UploadEvent, UploadOptions};
use super::worker::UploadWorker;

/// Runs upload batches: discovery, then a fixed pool of workers over a shared
/// backlog, reporting through the injected sink.
pub struct UploadManager {
    api: Arc<dyn PhotosApi>,
    sink: Arc<dyn EventSink>,
}

impl UploadManager {
    pub fn new(api: Arc<dyn PhotosApi>, sink: Arc<dyn EventSink>) -> Self {
        Self { api, sink }
    }

    /// Upload everything under `root`.
    ///
    /// Option and discovery errors are returned before any event is emitted.
    /// Once `BatchStart` is out, per-file failures only show up in events and
    /// in the returned summary.
    pub async fn upload(&self, root: &Path, options: &UploadOptions) -> Result<BatchSummary> {
        options.validate()?;

        let batch_id = BatchId::new();
        let started = Instant::now();

        let tasks = {
            let walk_root = root.to_path_buf();
            let (recursive, disable_filter) = (options.recursive, options.disable_filter);
            tokio::task::spawn_blocking(move || discover(&walk_root, recursive, disable_filter))
                .await
                .map_err(|err| GpError::discovery(root, std::io::Error::other(err.to_string())))??
        };

        let total = tasks.len();
        tracing::debug!(%batch_id, total, workers = options.workers, "discovery finished");
        self.sink.emit(UploadEvent::BatchStart { total });

        let backlog = Arc::new(Mutex::new(tasks.into_iter().collect::<VecDeque<_>>()));
        let summary = Arc::new(Mutex::new(BatchSummary {
            total,
            ..Default::default()
        }));

        // No point spawning workers that would find the backlog empty
        let worker_count = options.workers.min(total);
        let handles: Vec<_> = (0..worker_count)
            .map(|id| {
                let worker = UploadWorker {
                    id,
                    api: self.api.clone(),
                    sink: self.sink.clone(),
                    options: options.clone(),
                };
                tokio::spawn(worker.run(backlog.clone(), summary.clone()))
            })
            .collect();

        for result in join_all(handles).await {
            if let Err(err) = result {
                tracing::error!(%batch_id, error = %err, "upload worker panicked");
            }
        }

        let mut summary = summary.lock().await.clone();
        // Tasks a dead worker never reported count as failed
        let lost = summary.total - summary.finished();
        if lost > 0 {
            summary.failed += lost;
        }
        summary.elapsed = started.elapsed();

        self.sink.emit(UploadEvent::BatchStop {
            summary: summary.clone(),
        });
        Ok(summary)
    }
}
