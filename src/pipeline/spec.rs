//! Pipeline specifications: a seed URL plus typed steps.

use std::fmt;

use url::Url;

use super::error::SpecError;

/// Separator between steps in a human-authored pipeline string.
pub const STEP_SEPARATOR: char = '|';

/// One pipeline step, classified once when the pipeline is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// GET the current URL, keeping JSON bodies as structured data.
    Fetch,
    /// Terminal: return the current URL.
    DirectUrl,
    /// Terminal: download the current URL and return the local path.
    DownloadUrl,
    /// Pull one field out of the current structured data.
    Extract(String),
}

impl Step {
    /// Classifies an already-trimmed, non-empty step name.
    ///
    /// Any name that is not a keyword is a field extraction. A blank name is
    /// rejected later by [`PipelineSpec::new`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "fetch" => Self::Fetch,
            "direct_url" => Self::DirectUrl,
            "download_url" => Self::DownloadUrl,
            field => Self::Extract(field.to_string()),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => f.write_str("fetch"),
            Self::DirectUrl => f.write_str("direct_url"),
            Self::DownloadUrl => f.write_str("download_url"),
            Self::Extract(field) => f.write_str(field),
        }
    }
}

/// Splits a pipeline string like `"fetch | data | video_url | download_url"`.
///
/// A blank string yields no steps; a blank segment between separators is
/// rejected.
///
/// # Errors
///
/// Returns [`SpecError::EmptyStep`] for a blank segment.
pub fn parse_steps(pipeline: &str) -> Result<Vec<Step>, SpecError> {
    if pipeline.trim().is_empty() {
        return Ok(Vec::new());
    }

    pipeline
        .split(STEP_SEPARATOR)
        .enumerate()
        .map(|(index, raw)| {
            let name = raw.trim();
            if name.is_empty() {
                Err(SpecError::EmptyStep { index })
            } else {
                Ok(Step::from_name(name))
            }
        })
        .collect()
}

/// Immutable description of one pipeline: where to start and what to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSpec {
    seed_url: String,
    steps: Vec<Step>,
}

impl PipelineSpec {
    /// Builds a spec from already-typed steps.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::InvalidSeedUrl`] unless `seed_url` is an absolute
    /// http(s) URL, and [`SpecError::EmptyStep`] for an extraction with a
    /// blank field name.
    pub fn new(seed_url: impl Into<String>, steps: Vec<Step>) -> Result<Self, SpecError> {
        let seed_url = seed_url.into();
        let valid = Url::parse(&seed_url)
            .is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
        if !valid {
            return Err(SpecError::InvalidSeedUrl { url: seed_url });
        }
        if let Some(index) = steps
            .iter()
            .position(|step| matches!(step, Step::Extract(field) if field.trim().is_empty()))
        {
            return Err(SpecError::EmptyStep { index });
        }
        Ok(Self { seed_url, steps })
    }

    /// Parses a configured `{ url, pipeline }` pair.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError`] for an invalid seed URL or a blank step.
    pub fn parse(seed_url: impl Into<String>, pipeline: &str) -> Result<Self, SpecError> {
        let steps = parse_steps(pipeline)?;
        Self::new(seed_url, steps)
    }

    /// The URL the pipeline starts from.
    #[must_use]
    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    /// The steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}
