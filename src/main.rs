//! Pokedex CLI - Explore the Pokemon world from the terminal
//!
//! A REPL that pages through PokeAPI location areas, lists the Pokemon found in
//! each, and lets you catch and inspect them. API responses are held in a
//! time-expiring in-memory cache.

use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pokedexcli::app::App;
use pokedexcli::cache::Cache;
use pokedexcli::cli::{Cli, StartupConfig};
use pokedexcli::data::PokeApiClient;
use pokedexcli::repl;

/// Sends logs to stderr so they don't interleave with the REPL transcript
fn init_logging(config: &StartupConfig) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = StartupConfig::from_cli(&cli)?;

    init_logging(&config);
    info!(
        base_url = %config.base_url,
        cache_interval = ?config.cache_interval,
        "Starting Pokedex"
    );

    let cache = Cache::new(config.cache_interval)?;
    let client = PokeApiClient::with_base_url(cache, config.base_url);
    let app = App::new(client);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    // Joins the cache sweeper before the runtime goes away, even on a write error
    repl::run_session(app, stdin, &mut stdout).await?;

    Ok(())
}
