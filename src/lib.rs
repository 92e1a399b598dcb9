pub mod api;
pub mod config;
pub mod core;
pub mod credentials;
pub mod utils;

pub use crate::core::{
    BatchSummary,
    DedupKey,
    FileOutcome,
    GpError,
    PhotosApi,
    Result,
    UploadEvent,
    UploadManager,
    UploadOptions,
};

pub use api::{ApiConfig, HttpPhotosApi};
pub use credentials::{CredentialRecord, CredentialStore};
