//! Declarative fetch pipelines.
//!
//! A pipeline turns a seed URL into either a direct media URL or a locally
//! cached file by running a list of named steps:
//!
//! - `fetch` - GET the current URL; JSON bodies become the current data,
//!   other bodies just move the current URL to the post-redirect URL
//! - `direct_url` - terminal, returns the current URL
//! - `download_url` - terminal, downloads the current URL into the cache
//! - any other name - extract that field from the current JSON object; an
//!   `http(s)://` string value replaces the current URL
//!
//! # Example
//!
//! ```no_run
//! use media_fetch::download::HttpClient;
//! use media_fetch::pipeline::{PipelineSpec, resolve_media};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let spec = PipelineSpec::parse(
//!     "https://api.example.com/random",
//!     "fetch | data | video_url | download_url",
//! )?;
//! let client = HttpClient::new();
//! let outcome = resolve_media(&spec, Path::new("./cache"), &client).await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

mod error;
mod executor;
mod source;
mod spec;

pub use error::{PipelineError, SpecError};
pub use executor::{MediaOutcome, PipelineExecutor, execute, resolve_media};
pub use source::MediaSource;
pub use spec::{PipelineSpec, STEP_SEPARATOR, Step, parse_steps};
