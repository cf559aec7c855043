//! CLI entry point for media-fetch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use media_fetch::config::{self, DEFAULT_CACHE_FOLDER};
use media_fetch::{AppConfig, PipelineExecutor, PipelineSpec};
use tracing::{debug, info};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries only the result
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let app_config = load_config(&args)?;
    let cache_dir = args
        .cache_dir
        .clone()
        .unwrap_or_else(|| app_config.download.cache_folder.clone());

    let spec = select_spec(&args.command, &app_config)?;

    info!(
        url = spec.seed_url(),
        steps = spec.steps().len(),
        cache_dir = %cache_dir.display(),
        "resolving media"
    );

    let executor = PipelineExecutor::new(app_config.download.http_client());
    let outcome = executor
        .run(&spec, &cache_dir)
        .await
        .with_context(|| format!("Pipeline for {} failed", spec.seed_url()))?;

    println!("{outcome}");
    Ok(())
}

/// Loads the explicit `--config` file, else the default path when it exists.
fn load_config(args: &Args) -> Result<AppConfig> {
    let path: Option<PathBuf> = match &args.config {
        Some(path) => Some(path.clone()),
        None => config::resolve_default_config_path().filter(|path| path.exists()),
    };

    let Some(path) = path else {
        debug!(
            cache_folder = DEFAULT_CACHE_FOLDER,
            "no config file found, using defaults"
        );
        return Ok(AppConfig::default());
    };

    AppConfig::load(&path)
        .with_context(|| format!("Failed to load config file '{}'", path.display()))
}

/// Picks the pipeline to run: an ad-hoc one, or a random catalog entry.
fn select_spec(command: &Command, app_config: &AppConfig) -> Result<PipelineSpec> {
    if let Command::Run { url, pipeline } = command {
        return PipelineSpec::parse(url.clone(), pipeline)
            .with_context(|| format!("Invalid pipeline '{pipeline}' for {url}"));
    }

    let kind = command
        .media_kind()
        .context("Command does not select a media kind")?;
    app_config
        .choose(kind, &mut rand::thread_rng())
        .with_context(|| format!("Cannot pick a {kind} API"))
}
