//! HTTP access for pipeline fetches and media downloads.
//!
//! This module provides the network half of a pipeline run: fetching API
//! documents and streaming media into the cache directory.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large videos)
//! - Extension inference from Content-Disposition, `fileName` query,
//!   Content-Type, URL path, then URL keywords
//! - UUID-based filenames, never derived from untrusted input
//! - Write-then-rename so no partial file is left under the final name
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use media_fetch::download::HttpClient;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let file_path = client
//!     .download_to_dir("https://example.com/random.mp4", Path::new("./cache"))
//!     .await?;
//! println!("Downloaded: {}", file_path.display());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod extension;

pub use client::{FetchedDocument, HttpClient};
pub use constants::{
    CONNECT_TIMEOUT_SECS, MAX_DOCUMENT_BYTES, MAX_REDIRECTS, REQUEST_TIMEOUT_SECS,
};
pub use error::DownloadError;
pub use extension::{ExtensionHint, IMAGE_FALLBACK_EXTENSION, VIDEO_FALLBACK_EXTENSION};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
