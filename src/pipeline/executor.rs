//! Step-by-step interpreter for fetch pipelines.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::download::FetchedDocument;

use super::error::PipelineError;
use super::source::MediaSource;
use super::spec::{PipelineSpec, Step};

/// What a successful pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOutcome {
    /// A remote URL the caller must fetch or stream itself.
    RemoteUrl(String),
    /// A freshly written file; the caller owns cleanup.
    LocalFile(PathBuf),
}

impl fmt::Display for MediaOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteUrl(url) => f.write_str(url),
            Self::LocalFile(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The data slot of a run. Exactly one shape is meaningful at a time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CurrentData {
    /// Nothing fetched yet, or the last fetch was not JSON.
    Empty,
    /// The last extraction produced a URL; it now lives in `current_url`.
    Url(String),
    /// JSON available to the next extraction step.
    Structured(Value),
}

/// Per-run state. Never shared between runs.
#[derive(Debug)]
pub(crate) struct ExecutionState {
    current_url: String,
    data: CurrentData,
}

impl ExecutionState {
    pub(crate) fn new(seed_url: &str) -> Self {
        Self {
            current_url: seed_url.to_string(),
            data: CurrentData::Empty,
        }
    }

    /// Each fetch replaces whatever data the run held before.
    pub(crate) fn apply_fetch(&mut self, document: FetchedDocument) {
        match document.json {
            Some(value) => self.data = CurrentData::Structured(value),
            None => {
                self.current_url = document.final_url;
                self.data = CurrentData::Empty;
            }
        }
    }

    pub(crate) fn extract(&mut self, field: &str) -> Result<(), PipelineError> {
        let data = match &mut self.data {
            CurrentData::Structured(data) => data,
            CurrentData::Url(url) => {
                debug!(field, url = %url, "current data is a URL, nothing to extract");
                return Err(PipelineError::no_data(field));
            }
            CurrentData::Empty => return Err(PipelineError::no_data(field)),
        };
        let value = data
            .as_object_mut()
            .and_then(|object| object.remove(field))
            .ok_or_else(|| PipelineError::missing_field(field))?;

        match value {
            Value::String(url) if is_http_url(&url) => {
                debug!(field, url = %url, "extracted URL");
                self.current_url.clone_from(&url);
                self.data = CurrentData::Url(url);
            }
            other => {
                debug!(field, "extracted nested value");
                self.data = CurrentData::Structured(other);
            }
        }
        Ok(())
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Runs `steps` starting from `seed_url`, writing downloads under `target_dir`.
///
/// Steps run strictly in order; the first terminal step decides the result.
///
/// # Errors
///
/// Returns [`PipelineError`] when a fetch fails, an extraction finds nothing,
/// the download fails, or the steps run out before a terminal step.
#[instrument(skip(source, seed_url, steps), fields(seed_url = %seed_url, steps = steps.len()))]
pub async fn execute<S>(
    source: &S,
    seed_url: &str,
    steps: &[Step],
    target_dir: &Path,
) -> Result<MediaOutcome, PipelineError>
where
    S: MediaSource + ?Sized,
{
    let mut state = ExecutionState::new(seed_url);

    for (index, step) in steps.iter().enumerate() {
        debug!(index, step = %step, url = %state.current_url, "applying step");
        match step {
            Step::Fetch => {
                let document = source.fetch(&state.current_url).await?;
                state.apply_fetch(document);
            }
            Step::DirectUrl => {
                info!(url = %state.current_url, "pipeline resolved to direct URL");
                return Ok(MediaOutcome::RemoteUrl(state.current_url));
            }
            Step::DownloadUrl => {
                let path = source.download(&state.current_url, target_dir).await?;
                info!(path = %path.display(), "pipeline resolved to local file");
                return Ok(MediaOutcome::LocalFile(path));
            }
            Step::Extract(field) => state.extract(field)?,
        }
    }

    Err(PipelineError::PipelineIncomplete)
}

/// Executes a parsed [`PipelineSpec`].
///
/// This is the single operation the surrounding application needs: it returns
/// either a remote URL or the path of a file this call wrote.
///
/// # Errors
///
/// See [`execute`].
pub async fn resolve_media<S>(
    spec: &PipelineSpec,
    target_dir: &Path,
    source: &S,
) -> Result<MediaOutcome, PipelineError>
where
    S: MediaSource + ?Sized,
{
    execute(source, spec.seed_url(), spec.steps(), target_dir).await
}

/// Pairs a [`MediaSource`] with the pipeline interpreter.
///
/// Holds no per-run state, so one executor can serve concurrent runs.
#[derive(Debug, Clone)]
pub struct PipelineExecutor<S> {
    source: S,
}

impl<S: MediaSource> PipelineExecutor<S> {
    /// Creates an executor over `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Runs `spec`, writing any download into `target_dir`.
    ///
    /// # Errors
    ///
    /// See [`execute`].
    pub async fn run(
        &self,
        spec: &PipelineSpec,
        target_dir: &Path,
    ) -> Result<MediaOutcome, PipelineError> {
        resolve_media(spec, target_dir, &self.source).await
    }
}
