use std::path::{Path, PathBuf};
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;
use crate::core::{GpError, Result};

const FALLBACK_FILE_NAME: &str = "download";

/// Stream `url` to disk. `output` may be a directory (or empty for the current
/// one), in which case the file name comes from the response or the URL.
pub async fn download_file(client: &Client, url: &str, output: &Path) -> Result<PathBuf> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(GpError::transfer(format!("download failed with status {status}")));
    }

    let file_name = file_name_from_headers(response.headers())
        .or_else(|| file_name_from_url(url))
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
    let target = output_path(output, &file_name).await;

    let mut file = File::create(&target).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;

    Ok(target)
}

/// Write an in-memory payload using the same directory-or-file rules as `download_file`
pub async fn save_bytes(bytes: &[u8], output: &Path, file_name: &str) -> Result<PathBuf> {
    let target = output_path(output, file_name).await;
    tokio::fs::write(&target, bytes).await?;
    Ok(target)
}

async fn output_path(output: &Path, file_name: &str) -> PathBuf {
    if output.as_os_str().is_empty() {
        return PathBuf::from(file_name);
    }
    match tokio::fs::metadata(output).await {
        Ok(meta) if meta.is_dir() => output.join(file_name),
        _ => output.to_path_buf(),
    }
}

fn file_name_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"'))
        .and_then(sanitize)
}

fn file_name_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let last = url.path_segments()?.next_back()?.to_string();
    sanitize(&last)
}

/// Keep only the final path component so a server cannot steer writes elsewhere
fn sanitize(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_file_name_from_content_disposition() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"IMG_0042.HEIC\""),
        );
        assert_eq!(file_name_from_headers(&headers).as_deref(), Some("IMG_0042.HEIC"));
    }

    #[test]
    fn test_file_name_cannot_escape_directory() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"../../etc/passwd\""),
        );
        assert_eq!(file_name_from_headers(&headers).as_deref(), Some("passwd"));
    }

    #[test]
    fn test_file_name_from_url_path() {
        assert_eq!(
            file_name_from_url("https://cdn.example.com/a/b/clip.mp4?token=1").as_deref(),
            Some("clip.mp4")
        );
        assert_eq!(file_name_from_url("https://cdn.example.com/"), None);
    }

    #[tokio::test]
    async fn test_save_bytes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let saved = save_bytes(b"jpeg", dir.path(), "AF1Q.jpg").await.unwrap();
        assert_eq!(saved, dir.path().join("AF1Q.jpg"));

        let explicit = dir.path().join("thumb.jpg");
        let saved = save_bytes(b"jpeg", &explicit, "AF1Q.jpg").await.unwrap();
        assert_eq!(saved, explicit);
    }
}
