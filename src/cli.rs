//! Command-line interface parsing for Pokedex CLI
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated `StartupConfig`. Each flag can also be set from the environment.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::DEFAULT_BASE_URL;

/// Default cache interval in seconds
pub const DEFAULT_CACHE_INTERVAL_SECS: u64 = 5;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The cache interval was zero
    #[error("Invalid cache interval: must be at least 1 second")]
    InvalidCacheInterval,

    /// The base URL is not an http(s) URL
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
}

/// Pokedex CLI - Explore PokeAPI location areas and catch Pokemon
#[derive(Parser, Debug)]
#[command(name = "pokedexcli")]
#[command(about = "Explore PokeAPI location areas and catch Pokemon")]
#[command(version)]
pub struct Cli {
    /// How long API responses stay cached, in seconds
    ///
    /// Also how often expired responses are swept from memory.
    #[arg(
        long,
        value_name = "SECS",
        env = "POKEDEX_CACHE_INTERVAL",
        default_value_t = DEFAULT_CACHE_INTERVAL_SECS
    )]
    pub cache_interval: u64,

    /// PokeAPI base URL
    #[arg(long, value_name = "URL", env = "POKEDEX_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Interval for the response cache
    pub cache_interval: Duration,
    /// PokeAPI base URL, without a trailing slash
    pub base_url: String,
    /// Whether debug logging is enabled
    pub verbose: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            cache_interval: Duration::from_secs(DEFAULT_CACHE_INTERVAL_SECS),
            base_url: DEFAULT_BASE_URL.to_string(),
            verbose: false,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the interval is zero or the URL is not http(s)
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.cache_interval == 0 {
            return Err(CliError::InvalidCacheInterval);
        }

        let base_url = cli.base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CliError::InvalidBaseUrl(cli.base_url.clone()));
        }

        Ok(StartupConfig {
            cache_interval: Duration::from_secs(cli.cache_interval),
            base_url: base_url.to_string(),
            verbose: cli.verbose,
        })
    }

    /// Default `tracing` filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "pokedexcli=debug,warn"
        } else {
            "pokedexcli=warn"
        }
    }
}
