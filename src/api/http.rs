use std::path::Path;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Body, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use url::Url;
use crate::core::{DedupKey, DownloadUrl, GpError, PhotosApi, Result, ThumbnailRequest};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Header carrying the raw auth string on every request
const AUTH_HEADER: &str = "X-Auth-Data";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub auth_data: String,
    pub proxy: Option<String>,
    pub endpoint: String,
}

/// `PhotosApi` over the JSON gateway that fronts the backend.
///
/// Routes, relative to the endpoint:
/// - `POST resolve/media`, `POST resolve/item`: `{"input"}` -> `{"key"}`
/// - `GET media/by-dedup-key/{key}`: `{"media_key"}`, 404 when absent
/// - `POST upload?dedup_key=..&file_name=..`: raw file body -> `{"media_key"}`
/// - `GET media/{key}/download-url`: `{"url", "is_edited"}`
/// - `GET media/{key}/thumbnail`: image bytes
/// - `POST items/trash`, `items/restore`, `items/archive`: `{"item_keys", ..}`
/// - `POST items/{key}/favourite`, `items/{key}/caption`
#[derive(Debug, Clone)]
pub struct HttpPhotosApi {
    client: Client,
    endpoint: Url,
    auth_data: String,
}

#[derive(Serialize)]
struct ResolveRequest<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct ResolveResponse {
    key: String,
}

#[derive(Deserialize)]
struct MediaKeyResponse {
    media_key: String,
}

#[derive(Deserialize)]
struct DownloadUrlResponse {
    url: String,
    #[serde(default)]
    is_edited: bool,
}

#[derive(Serialize)]
struct ItemsRequest<'a> {
    item_keys: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    archived: Option<bool>,
}

#[derive(Serialize)]
struct FavouriteRequest {
    favourite: bool,
}

#[derive(Serialize)]
struct CaptionRequest<'a> {
    caption: &'a str,
}

impl HttpPhotosApi {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut endpoint = Url::parse(&config.endpoint)
            .map_err(|err| GpError::transfer(format!("invalid endpoint '{}': {err}", config.endpoint)))?;
        if endpoint.cannot_be_a_base() {
            return Err(GpError::transfer(format!("invalid endpoint '{}'", config.endpoint)));
        }
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.is_empty()) {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            auth_data: config.auth_data,
        })
    }

    /// The underlying client, configured with the same proxy
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_json<T: Serialize + ?Sized>(&self, url: Url, body: &T) -> Result<Response> {
        let response = self
            .client
            .post(url)
            .header(AUTH_HEADER, &self.auth_data)
            .json(body)
            .send()
            .await?;
        check_status(response).await
    }

    async fn get(&self, url: Url) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .header(AUTH_HEADER, &self.auth_data)
            .send()
            .await?;
        Ok(response)
    }

    async fn resolve(&self, kind: &str, input: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url(&["resolve", kind]))
            .header(AUTH_HEADER, &self.auth_data)
            .json(&ResolveRequest { input })
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GpError::NotFound(input.to_string()));
        }
        let resolved: ResolveResponse = check_status(response).await?.json().await?;
        Ok(resolved.key)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GpError::transfer(format!("{} {}: {}", status_kind(status), status, body.trim())))
}

fn status_kind(status: StatusCode) -> &'static str {
    if status.is_server_error() { "server error" } else { "request rejected" }
}

#[async_trait]
impl PhotosApi for HttpPhotosApi {
    async fn resolve_media_key(&self, input: &str) -> Result<String> {
        self.resolve("media", input).await
    }

    async fn resolve_item_key(&self, input: &str) -> Result<String> {
        self.resolve("item", input).await
    }

    async fn find_by_dedup_key(&self, key: &DedupKey) -> Result<Option<String>> {
        let response = self.get(self.url(&["media", "by-dedup-key", key.as_str()])).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let found: MediaKeyResponse = check_status(response).await?.json().await?;
        Ok(Some(found.media_key))
    }

    async fn upload_file(&self, path: &Path, key: &DedupKey) -> Result<String> {
        let file = File::open(path).await?;
        let size = file.metadata().await?.len();
        let body = Body::wrap_stream(ReaderStream::new(file));

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut url = self.url(&["upload"]);
        url.query_pairs_mut()
            .append_pair("dedup_key", key.as_str())
            .append_pair("file_name", &file_name);

        let response = self
            .client
            .post(url)
            .header(AUTH_HEADER, &self.auth_data)
            .header(reqwest::header::CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await?;

        let uploaded: MediaKeyResponse = check_status(response).await?.json().await?;
        Ok(uploaded.media_key)
    }

    async fn download_url(&self, media_key: &str) -> Result<DownloadUrl> {
        let response = self.get(self.url(&["media", media_key, "download-url"])).await?;
        let found: DownloadUrlResponse = check_status(response).await?.json().await?;
        Ok(DownloadUrl {
            url: found.url,
            is_edited: found.is_edited,
        })
    }

    async fn thumbnail(&self, media_key: &str, request: &ThumbnailRequest) -> Result<Bytes> {
        let mut url = self.url(&["media", media_key, "thumbnail"]);
        {
            let mut query = url.query_pairs_mut();
            if let Some(width) = request.width {
                query.append_pair("width", &width.to_string());
            }
            if let Some(height) = request.height {
                query.append_pair("height", &height.to_string());
            }
            query
                .append_pair("jpeg", if request.force_jpeg { "1" } else { "0" })
                .append_pair("overlay", if request.no_overlay { "0" } else { "1" });
        }

        let response = self.get(url).await?;
        Ok(check_status(response).await?.bytes().await?)
    }

    async fn move_to_trash(&self, item_keys: &[String]) -> Result<()> {
        let body = ItemsRequest { item_keys, archived: None };
        self.post_json(self.url(&["items", "trash"]), &body).await?;
        Ok(())
    }

    async fn restore_from_trash(&self, item_keys: &[String]) -> Result<()> {
        let body = ItemsRequest { item_keys, archived: None };
        self.post_json(self.url(&["items", "restore"]), &body).await?;
        Ok(())
    }

    async fn set_archived(&self, item_keys: &[String], archived: bool) -> Result<()> {
        let body = ItemsRequest { item_keys, archived: Some(archived) };
        self.post_json(self.url(&["items", "archive"]), &body).await?;
        Ok(())
    }

    async fn set_favourite(&self, item_key: &str, favourite: bool) -> Result<()> {
        self.post_json(self.url(&["items", item_key, "favourite"]), &FavouriteRequest { favourite })
            .await?;
        Ok(())
    }

    async fn set_caption(&self, item_key: &str, caption: &str) -> Result<()> {
        self.post_json(self.url(&["items", item_key, "caption"]), &CaptionRequest { caption })
            .await?;
        Ok(())
    }
}
