//! TOML configuration: the API catalog and download settings.
//!
//! ```toml
//! [download]
//! cache_folder = "/app/sharedFolder"
//! connect_timeout_secs = 10
//! timeout_secs = 60
//!
//! [[api.video_api]]
//! url = "https://api.example.com/random"
//! pipeline = "fetch | data | video_url | download_url"
//! ```
//!
//! Unknown tables (for example a `[platform]` section consumed by a chat
//! bridge) are ignored.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::download::{CONNECT_TIMEOUT_SECS, HttpClient, REQUEST_TIMEOUT_SECS};
use crate::pipeline::{PipelineSpec, SpecError};

/// Cache directory used when the config does not name one.
pub const DEFAULT_CACHE_FOLDER: &str = "/app/sharedFolder";

const TIMEOUT_RANGE_SECS: std::ops::RangeInclusive<u64> = 1..=3600;

/// Which configured API list to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Short videos.
    Video,
    /// Pictures.
    Picture,
}

impl MediaKind {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Picture => "picture",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while loading or using the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A configured API entry does not form a valid pipeline.
    #[error("invalid {kind} API entry #{index}: {source}")]
    Spec {
        /// List the entry belongs to.
        kind: MediaKind,
        /// Zero-based position in that list.
        index: usize,
        /// Why the entry was rejected.
        #[source]
        source: SpecError,
    },

    /// The requested list is empty.
    #[error("no {kind} API configured\n  Suggestion: add an [[api.{kind}_api]] entry")]
    NoApiConfigured {
        /// The empty list.
        kind: MediaKind,
    },
}

/// One upstream API: a seed URL and the pipeline that resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiEntry {
    /// Seed URL.
    pub url: String,
    /// `|`-separated step names.
    pub pipeline: String,
}

impl ApiEntry {
    /// Parses this entry into a pipeline spec.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError`] for a bad seed URL or a blank step.
    pub fn to_spec(&self) -> Result<PipelineSpec, SpecError> {
        PipelineSpec::parse(self.url.clone(), &self.pipeline)
    }
}

/// Configured APIs per media kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiCatalog {
    /// Video sources.
    pub video_api: Vec<ApiEntry>,
    /// Picture sources.
    pub picture_api: Vec<ApiEntry>,
}

impl ApiCatalog {
    /// Entries for `kind`.
    #[must_use]
    pub fn entries(&self, kind: MediaKind) -> &[ApiEntry] {
        match kind {
            MediaKind::Video => &self.video_api,
            MediaKind::Picture => &self.picture_api,
        }
    }
}

/// Where and how downloads happen.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Directory downloaded media is written to.
    pub cache_folder: PathBuf,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Total per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            cache_folder: PathBuf::from(DEFAULT_CACHE_FOLDER),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl DownloadSettings {
    /// Builds an HTTP client honoring the configured timeouts.
    #[must_use]
    pub fn http_client(&self) -> HttpClient {
        HttpClient::new_with_timeouts(self.connect_timeout_secs, self.timeout_secs)
    }
}

/// Whole application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Download settings.
    pub download: DownloadSettings,
    /// API catalog.
    pub api: ApiCatalog,
}

impl AppConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        debug!(
            path = %path.display(),
            video_apis = config.api.video_api.len(),
            picture_apis = config.api.picture_api.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Checks value ranges and that every API entry parses.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout_secs(
            "download.connect_timeout_secs",
            self.download.connect_timeout_secs,
        )?;
        validate_timeout_secs("download.timeout_secs", self.download.timeout_secs)?;
        if self.download.cache_folder.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "download.cache_folder",
                reason: "must not be empty".to_string(),
            });
        }

        for kind in [MediaKind::Video, MediaKind::Picture] {
            for (index, entry) in self.api.entries(kind).iter().enumerate() {
                entry
                    .to_spec()
                    .map_err(|source| ConfigError::Spec {
                        kind,
                        index,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Picks one configured API for `kind` at random.
    ///
    /// The RNG is passed in so callers (and tests) control the choice.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoApiConfigured`] for an empty list, or
    /// [`ConfigError::Spec`] if the chosen entry does not parse.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        kind: MediaKind,
        rng: &mut R,
    ) -> Result<PipelineSpec, ConfigError> {
        let entries = self.api.entries(kind);
        if entries.is_empty() {
            return Err(ConfigError::NoApiConfigured { kind });
        }
        let index = rng.gen_range(0..entries.len());
        let entry = &entries[index];
        debug!(%kind, index, url = %entry.url, "chose API entry");
        entry.to_spec().map_err(|source| ConfigError::Spec {
            kind,
            index,
            source,
        })
    }
}

fn validate_timeout_secs(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if TIMEOUT_RANGE_SECS.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value}, expected range 1..=3600"),
        })
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/media-fetch/config.toml`
/// 2. `$HOME/.config/media-fetch/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("media-fetch")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("media-fetch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}
