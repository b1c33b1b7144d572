//! Configuration management using the prefer crate for discovery.
//!
//! A `tracklist.{toml,yaml,json}` file is discovered in the standard
//! locations; a missing file means defaults. Catalog credentials can always
//! be supplied through `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::CatalogConfig;
use crate::pipeline::ResolveOptions;
use crate::scrapers::RateLimitConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Page fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// None: default agent, "impersonate": random browser agent, else literal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay after each page fetch in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// Page budget when none is given on the command line
    #[serde(default = "default_pages")]
    pub default_pages: u32,
    /// Minimum spacing per host in milliseconds, matched by domain suffix
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub host_delays_ms: HashMap<String, u64>,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_request_delay_ms() -> u64 {
    250
}
fn default_pages() -> u32 {
    1
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            default_pages: default_pages(),
            host_delays_ms: HashMap::new(),
        }
    }
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Rate limiter tuning with the configured per-host delays.
    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            host_delays: self
                .host_delays_ms
                .iter()
                .map(|(host, ms)| (host.clone(), Duration::from_millis(*ms)))
                .collect(),
            ..Default::default()
        }
    }
}

/// Entry resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Tracks kept for each `#top` artist
    #[serde(default = "default_top_tracks")]
    pub top_tracks: usize,
    /// Skip references with no catalog match instead of failing
    #[serde(default = "default_true")]
    pub skip_not_found: bool,
}

fn default_top_tracks() -> usize {
    5
}
fn default_true() -> bool {
    true
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            top_tracks: default_top_tracks(),
            skip_not_found: default_true(),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub resolve: ResolveConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    pub async fn load() -> Self {
        match prefer::load("tracklist").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        warn!("Ignoring config file {}: {}", path.display(), e);
                        Self::default_with_env()
                    }
                },
                None => Self::default_with_env(),
            },
            Err(_) => {
                debug!("No config file found, using defaults");
                Self::default_with_env()
            }
        }
    }

    /// Create a default config with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        let mut config = Self::default();
        config.catalog.apply_env();
        config
    }

    /// Load configuration from a specific file path.
    /// The format follows the file extension (toml, yaml/yml, otherwise JSON).
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)?,
            _ => serde_json::from_str(&contents)?,
        };

        config.source_path = Some(path.to_path_buf());
        config.catalog.apply_env();
        Ok(config)
    }

    /// Resolution options for the pipeline.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            skip_not_found: self.resolve.skip_not_found,
            top_tracks: self.resolve.top_tracks,
            default_pages: self.scraper.default_pages,
        }
    }
}
