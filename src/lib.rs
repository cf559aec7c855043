//! Media Fetch Library
//!
//! This library resolves random media from upstream APIs by running
//! declarative fetch pipelines: a seed URL plus steps such as
//! `fetch | data | video_url | download_url`.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`pipeline`] - Step parsing and the pipeline interpreter
//! - [`download`] - HTTP fetches and streaming downloads with extension inference
//! - [`config`] - TOML API catalog and download settings

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod pipeline;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError, MediaKind};
pub use download::{DownloadError, HttpClient};
pub use pipeline::{
    MediaOutcome, MediaSource, PipelineError, PipelineExecutor, PipelineSpec, SpecError, Step,
    resolve_media,
};
