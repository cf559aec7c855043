//! Error types for pipeline parsing and execution.

use thiserror::Error;

use crate::download::DownloadError;

/// Errors raised while turning a human-authored pipeline string into steps.
///
/// These are detected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// A `|`-separated segment was blank, e.g. `"fetch || direct_url"`.
    #[error("pipeline step {index} is empty\n  Suggestion: remove the stray '|' separator")]
    EmptyStep {
        /// Zero-based position of the empty segment.
        index: usize,
    },

    /// The seed URL is not an absolute http(s) URL.
    #[error("invalid seed URL '{url}'\n  Suggestion: use an absolute http:// or https:// URL")]
    InvalidSeedUrl {
        /// The rejected URL.
        url: String,
    },
}

/// Errors that end a single pipeline run.
///
/// None of these are fatal to the process; the caller decides whether to try
/// again, possibly with a different configured API entry.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A `fetch` step got a non-2xx answer.
    #[error("fetch failed for {url}: HTTP {status}")]
    FetchFailed {
        /// The URL that was fetched.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// A `fetch` step failed before any status was received.
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        /// The URL that was fetched.
        url: String,
        /// The underlying transport error.
        #[source]
        source: DownloadError,
    },

    /// An extraction step ran with no structured data available.
    #[error("no structured data to extract '{field}' from")]
    NoDataToExtract {
        /// The field the step asked for.
        field: String,
    },

    /// An extraction step named a field absent from the current data, or the
    /// current data is not a JSON object.
    #[error("field '{field}' not found in response")]
    MissingField {
        /// The field the step asked for.
        field: String,
    },

    /// The steps ran out before a `direct_url` or `download_url` step.
    #[error("pipeline did not end with direct_url or download_url")]
    PipelineIncomplete,

    /// The terminal `download_url` step failed.
    #[error("download step failed: {0}")]
    Download(#[from] DownloadError),
}

impl PipelineError {
    /// Maps a fetch-side transport error, surfacing bad statuses as `FetchFailed`.
    #[must_use]
    pub fn from_fetch(url: impl Into<String>, source: DownloadError) -> Self {
        match source {
            DownloadError::DownloadFailed { url, status } => Self::FetchFailed { url, status },
            source => Self::Fetch {
                url: url.into(),
                source,
            },
        }
    }

    /// Creates a `NoDataToExtract` error.
    pub fn no_data(field: impl Into<String>) -> Self {
        Self::NoDataToExtract {
            field: field.into(),
        }
    }

    /// Creates a `MissingField` error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Whether the same pipeline might succeed if run again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::FetchFailed { status, .. } => *status >= 500 || *status == 429,
            Self::Fetch { source, .. } | Self::Download(source) => source.is_retryable(),
            Self::NoDataToExtract { .. } | Self::MissingField { .. } | Self::PipelineIncomplete => {
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fetch_promotes_status_errors() {
        let err = PipelineError::from_fetch(
            "https://api.test/r",
            DownloadError::download_failed("https://api.test/r", 500),
        );
        match err {
            PipelineError::FetchFailed { url, status } => {
                assert_eq!(url, "https://api.test/r");
                assert_eq!(status, 500);
            }
            other => panic!("Expected FetchFailed, got: {other:?}"),
        }
    }

    #[test]
    fn test_from_fetch_keeps_transport_errors() {
        let err = PipelineError::from_fetch(
            "https://api.test/r",
            DownloadError::timeout("https://api.test/r"),
        );
        assert!(matches!(err, PipelineError::Fetch { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let msg = PipelineError::missing_field("video_url").to_string();
        assert!(msg.contains("video_url"), "Expected field in: {msg}");
        let msg = PipelineError::no_data("data").to_string();
        assert!(msg.contains("'data'"), "Expected field in: {msg}");
    }

    #[test]
    fn test_extraction_errors_are_not_retryable() {
        assert!(!PipelineError::missing_field("x").is_retryable());
        assert!(!PipelineError::no_data("x").is_retryable());
        assert!(!PipelineError::PipelineIncomplete.is_retryable());
    }

    #[test]
    fn test_spec_error_display() {
        let msg = SpecError::EmptyStep { index: 1 }.to_string();
        assert!(msg.contains("step 1"), "Expected index in: {msg}");
    }
}
