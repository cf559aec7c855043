//! HTTP client wrapper for pipeline fetches and media downloads.
//!
//! This module provides the `HttpClient` struct which performs the two kinds
//! of network access a pipeline needs: fetching an API document (JSON or a
//! redirect to media) and streaming a media resource into the cache directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::redirect::Policy;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::constants::{
    CONNECT_TIMEOUT_SECS, MAX_DOCUMENT_BYTES, MAX_REDIRECTS, REQUEST_TIMEOUT_SECS,
};
use super::error::DownloadError;
use super::extension::ExtensionHint;
use crate::user_agent;

/// HTTP client for pipeline fetches and streaming downloads.
///
/// Created once and shared across pipeline runs; cloning is cheap and reuses
/// the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use media_fetch::download::HttpClient;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let path = client.download_to_dir("https://example.com/clip.mp4", Path::new("./cache")).await?;
/// println!("Downloaded to: {}", path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// Body of a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    /// URL after following redirects.
    pub final_url: String,
    /// Parsed JSON body, `None` when the body is not JSON.
    pub json: Option<Value>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 10 seconds
    /// - Request timeout: 60 seconds
    /// - Redirects: up to 10 hops
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, request_timeout_secs: u64) -> Self {
        let client = build_client(connect_timeout_secs, request_timeout_secs)
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches `url` and tries to interpret the body as JSON.
    ///
    /// A body that is not JSON is not an error: the caller receives the final
    /// post-redirect URL with `json: None`. Media content types are never
    /// read, and bodies over [`MAX_DOCUMENT_BYTES`] are treated as non-JSON.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the URL is invalid, the request fails or
    /// times out, or the server answers with a non-2xx status.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_document(&self, url: &str) -> Result<FetchedDocument, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self.send_get(url).await?;
        let final_url = response.url().to_string();

        if let Some(content_type) =
            header_string(&response, CONTENT_TYPE).filter(|ct| is_media_content_type(ct))
        {
            debug!(
                final_url = %final_url,
                content_type = %content_type,
                "fetched media, body not read"
            );
            return Ok(FetchedDocument {
                final_url,
                json: None,
            });
        }

        let Some(body) = read_document_body(response, url, MAX_DOCUMENT_BYTES).await? else {
            debug!(
                final_url = %final_url,
                limit = MAX_DOCUMENT_BYTES,
                "fetched body exceeds document limit"
            );
            return Ok(FetchedDocument {
                final_url,
                json: None,
            });
        };

        let json = match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Some(value),
            Err(error) => {
                debug!(final_url = %final_url, error = %error, "fetched body is not JSON");
                None
            }
        };

        Ok(FetchedDocument { final_url, json })
    }

    /// Downloads `url` into `output_dir` under a freshly generated name.
    ///
    /// The directory is created if missing. The file is written to a hidden
    /// `.part` sibling first and renamed once the body is complete, so no
    /// partial file is ever visible under the final name.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The directory cannot be created
    /// - The request fails (network error, timeout)
    /// - The server returns a non-2xx status
    /// - Writing or renaming the file fails
    #[must_use = "download result contains the path to the downloaded file"]
    #[instrument(skip(self), fields(url = %url))]
    pub async fn download_to_dir(
        &self,
        url: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        debug!("starting download");

        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| DownloadError::io(output_dir, e))?;

        let response = self.send_get(url).await?;

        let content_disposition = header_string(&response, CONTENT_DISPOSITION);
        let content_type = header_string(&response, CONTENT_TYPE);
        let final_url = response.url().clone();
        let extension = ExtensionHint {
            content_disposition: content_disposition.as_deref(),
            content_type: content_type.as_deref(),
            final_url: Some(&final_url),
            requested_url: url,
        }
        .resolve();

        let id = Uuid::new_v4();
        let part_path = output_dir.join(format!(".{id}.part"));
        let file_path = output_dir.join(format!("{id}{extension}"));
        debug!(path = %file_path.display(), "resolved output path");

        // Removes the .part file on every early return, and when the future is dropped.
        let mut guard = PartialFileGuard::new(part_path.clone());

        let mut file = File::create(&part_path)
            .await
            .map_err(|e| DownloadError::io(part_path.clone(), e))?;
        let bytes_written = stream_to_file(&mut file, response, url, &part_path).await?;
        drop(file);

        tokio::fs::rename(&part_path, &file_path)
            .await
            .map_err(|e| DownloadError::io(file_path.clone(), e))?;
        guard.disarm();

        info!(
            path = %file_path.display(),
            bytes = bytes_written,
            "download complete"
        );

        Ok(file_path)
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "non-success status");
            return Err(DownloadError::download_failed(url, status.as_u16()));
        }

        Ok(response)
    }
}

/// Deletes a partially written file unless disarmed.
struct PartialFileGuard {
    path: PathBuf,
    armed: bool,
}

impl PartialFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PartialFileGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed partial download"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove partial download"
            ),
        }
    }
}

/// Whether a `Content-Type` announces media rather than an API document.
fn is_media_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("image/")
        || mime.starts_with("video/")
        || mime.starts_with("audio/")
        || mime == "application/octet-stream"
}

/// Reads at most `limit` body bytes; `None` when the body is larger.
async fn read_document_body(
    response: reqwest::Response,
    url: &str,
    limit: u64,
) -> Result<Option<Vec<u8>>, DownloadError> {
    if response.content_length().is_some_and(|len| len > limit) {
        return Ok(None);
    }

    let mut stream = response.bytes_stream();
    let mut body = Vec::new();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::from_reqwest(url, e))?;
        if (body.len() + chunk.len()) as u64 > limit {
            return Ok(None);
        }
        body.extend_from_slice(&chunk);
    }

    Ok(Some(body))
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::from_reqwest(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}

fn header_string(
    response: &reqwest::Response,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn build_client(
    connect_timeout_secs: u64,
    request_timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(request_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
        .build()
}
