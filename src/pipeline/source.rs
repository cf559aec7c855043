//! Network seam between the executor and the outside world.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::download::{DownloadError, FetchedDocument, HttpClient};

use super::error::PipelineError;

/// Performs the two network effects a pipeline can have.
///
/// [`HttpClient`] is the production implementation; tests substitute stubs to
/// exercise the executor without sockets.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// GETs `url`, returning parsed JSON or the post-redirect URL.
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, PipelineError>;

    /// Downloads `url` into `target_dir`, returning the written path.
    async fn download(&self, url: &str, target_dir: &Path) -> Result<PathBuf, DownloadError>;
}

#[async_trait]
impl MediaSource for HttpClient {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, PipelineError> {
        self.fetch_document(url)
            .await
            .map_err(|e| PipelineError::from_fetch(url, e))
    }

    async fn download(&self, url: &str, target_dir: &Path) -> Result<PathBuf, DownloadError> {
        self.download_to_dir(url, target_dir).await
    }
}

#[async_trait]
impl<T: MediaSource + ?Sized> MediaSource for &T {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, PipelineError> {
        (**self).fetch(url).await
    }

    async fn download(&self, url: &str, target_dir: &Path) -> Result<PathBuf, DownloadError> {
        (**self).download(url, target_dir).await
    }
}

#[async_trait]
impl<T: MediaSource + ?Sized> MediaSource for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, PipelineError> {
        (**self).fetch(url).await
    }

    async fn download(&self, url: &str, target_dir: &Path) -> Result<PathBuf, DownloadError> {
        (**self).download(url, target_dir).await
    }
}
