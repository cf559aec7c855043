//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use media_fetch::MediaKind;

/// Resolve random media from configured fetch pipelines.
///
/// Prints the resolved direct URL or the path of the downloaded file.
#[derive(Parser, Debug)]
#[command(name = "media-fetch")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/media-fetch/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory downloads are written to (overrides the config file)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Resolve a random configured video API
    Video,
    /// Resolve a random configured picture API
    Picture,
    /// Run an ad-hoc pipeline without a config entry
    Run {
        /// Seed URL
        #[arg(long)]
        url: String,
        /// Steps separated by '|', e.g. "fetch | data | url | download_url"
        #[arg(long)]
        pipeline: String,
    },
}

impl Command {
    /// Media kind for catalog-driven commands.
    #[must_use]
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self {
            Self::Video => Some(MediaKind::Video),
            Self::Picture => Some(MediaKind::Picture),
            Self::Run { .. } => None,
        }
    }
}
