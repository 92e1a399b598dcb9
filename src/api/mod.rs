mod download;
mod http;

pub use download::{download_file, save_bytes};
pub use http::{ApiConfig, HttpPhotosApi, DEFAULT_ENDPOINT};
