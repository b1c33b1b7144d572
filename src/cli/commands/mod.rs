//! CLI parser and dispatch to command modules.

mod resolve;
mod scrape;
mod sources;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::catalog::SpotifyClient;
use crate::config::Config;
use crate::pipeline::{Pipeline, PipelineObserver};
use crate::scrapers::{HttpClient, RateLimiter};

#[derive(Parser)]
#[command(name = "tracklist")]
#[command(about = "Turn music pages and references into Spotify tracklists")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl a page and print the intermediate tracklist
    Scrape {
        /// Page URI (last.fm, pitchfork, rateyourmusic, reddit, youtube, bbc, or any page)
        uri: String,
        /// Number of pages to follow (default from config)
        #[arg(short, long)]
        pages: Option<u32>,
    },

    /// Resolve a page, a tracklist file, or a reference into Spotify tracks
    Resolve {
        /// Page URI, path to a tracklist file, or an "artist - title" reference
        input: String,
        /// Number of pages to follow when the input is a URI
        #[arg(short, long)]
        pages: Option<u32>,
        /// Fail on references with no catalog match instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// List supported sources
    Sources,
}

/// Build a pipeline from config, sharing one rate limiter between the page
/// fetcher and the catalog client.
fn build_pipeline(config: &Config, observer: Arc<dyn PipelineObserver>) -> anyhow::Result<Pipeline> {
    let rate_limiter = RateLimiter::with_config(config.scraper.rate_limit_config());

    let fetcher = HttpClient::with_user_agent(
        config.scraper.timeout(),
        config.scraper.request_delay(),
        config.scraper.user_agent.as_deref(),
    )
    .context("Failed to create HTTP client")?
    .with_rate_limiter(rate_limiter.clone());

    let catalog = SpotifyClient::new(config.catalog.clone(), config.scraper.timeout())
        .context("Failed to create catalog client")?
        .with_rate_limiter(rate_limiter);

    Ok(Pipeline::new(Arc::new(fetcher), Arc::new(catalog))
        .with_observer(observer)
        .with_options(config.resolve_options()))
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load().await,
    };

    match cli.command {
        Commands::Scrape { uri, pages } => scrape::cmd_scrape(&config, &uri, pages).await,
        Commands::Resolve {
            input,
            pages,
            strict,
        } => resolve::cmd_resolve(&config, &input, pages, strict).await,
        Commands::Sources => sources::cmd_sources(),
    }
}
