use std::path::Path;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use super::dedup::DedupKey;
use super::errors::Result;
use super::types::{DownloadUrl, ThumbnailRequest, UploadEvent};

/// Backend capabilities the CLI drives. Keys are opaque backend identifiers.
#[async_trait]
pub trait PhotosApi: Send + Sync {
    /// Turn user input (a media key, a share URL, a dedup key...) into a media key
    async fn resolve_media_key(&self, input: &str) -> Result<String>;

    /// Same as `resolve_media_key`, for the item keys used by trash/archive/etc
    async fn resolve_item_key(&self, input: &str) -> Result<String>;

    /// Media key of content already stored under `key`, if any
    async fn find_by_dedup_key(&self, key: &DedupKey) -> Result<Option<String>>;

    /// Upload one file and return its media key
    async fn upload_file(&self, path: &Path, key: &DedupKey) -> Result<String>;

    /// Where the original (or edited) file can be fetched from
    async fn download_url(&self, media_key: &str) -> Result<DownloadUrl>;

    /// Rendered thumbnail image bytes
    async fn thumbnail(&self, media_key: &str, request: &ThumbnailRequest) -> Result<Bytes>;

    /// Move items to the trash
    async fn move_to_trash(&self, item_keys: &[String]) -> Result<()>;

    /// Bring trashed items back
    async fn restore_from_trash(&self, item_keys: &[String]) -> Result<()>;

    /// Archive items, or unarchive them when `archived` is false
    async fn set_archived(&self, item_keys: &[String], archived: bool) -> Result<()>;

    /// Add to or remove from favourites
    async fn set_favourite(&self, item_key: &str, favourite: bool) -> Result<()>;

    /// Replace the item's caption
    async fn set_caption(&self, item_key: &str, caption: &str) -> Result<()>;
}

/// Receives pipeline events. Called concurrently from every worker.
///
/// Ordering: `BatchStart` before any per-file event, `BatchStop` after all of
/// them. Events from different workers may interleave arbitrarily.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: UploadEvent);
}

impl<F> EventSink for F
where
    F: Fn(UploadEvent) + Send + Sync,
{
    fn emit(&self, event: UploadEvent) {
        self(event)
    }
}

/// Forwards events into a channel, for callers that prefer to consume a stream
pub struct ChannelSink {
    event_tx: mpsc::UnboundedSender<UploadEvent>,
}

impl ChannelSink {
    /// A sink plus the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UploadEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { event_tx }, event_rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: UploadEvent) {
        // Receiver gone means nobody is listening any more
        let _ = self.event_tx.send(event);
    }
}
