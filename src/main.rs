//! Legacy-Populate main entry point
//!
//! This is the command-line interface for migrating legacy content into the
//! relational store.

use anyhow::Context;
use clap::Parser;
use legacy_populate::config::{load_config_with_hash, validate, Config};
use legacy_populate::{ContentId, Populator, RemoteHost, Resolver, SqliteBackend, SqliteCache};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Legacy-Populate: migrates legacy modules and collections
///
/// Every version of each identifier is fetched from the legacy host and
/// stored once. Collections are populated together with their members and
/// modules together with their resource files.
#[derive(Parser, Debug)]
#[command(name = "legacy-populate")]
#[command(version)]
#[command(about = "Populate a relational store from legacy content", long_about = None)]
struct Cli {
    /// Content identifiers to populate (e.g. m42119 col11406)
    #[arg(value_name = "ID", required = true)]
    ids: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Legacy host to read from, overriding the config file
    #[arg(short, long, value_name = "HOST")]
    source_host: Option<String>,

    /// Database to populate, overriding the config file
    #[arg(short, long, value_name = "PATH")]
    database: Option<String>,

    /// Document cache file, overriding the config file
    #[arg(long, value_name = "PATH")]
    cache: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Parse every identifier before touching the network
    let ids = cli
        .ids
        .iter()
        .map(|id| ContentId::parse(id))
        .collect::<Result<Vec<_>, _>>()?;

    let config = load(&cli)?;

    let cache = SqliteCache::open(Path::new(&config.storage.cache_path))
        .with_context(|| format!("opening cache {}", config.storage.cache_path))?;
    let backend = SqliteBackend::open(Path::new(&config.storage.database_path))
        .with_context(|| format!("opening database {}", config.storage.database_path))?;
    let host = RemoteHost::from_config(&config)?;

    tracing::info!(
        "Populating {} identifier(s) from {} into {}",
        ids.len(),
        host.base_url(),
        config.storage.database_path
    );

    let resolver = Resolver::new(host, Arc::new(cache));
    let mut populator = Populator::new(resolver, backend);

    let mut inserted = 0usize;
    let mut visited = 0usize;
    for id in &ids {
        let result = populator
            .populate(id, |event| {
                visited += 1;
                if event.is_inserted() {
                    inserted += 1;
                }
                println!("{}", event);
            })
            .await;

        if let Err(e) = result {
            tracing::error!("Population of {} failed: {}", id, e);
            return Err(e.into());
        }
    }

    tracing::info!("Done: {} visited, {} inserted", visited, inserted);
    Ok(())
}

/// Builds the effective configuration: file (or defaults), then flags
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("loading {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(host) = &cli.source_host {
        config.source.host = host.clone();
    }
    if let Some(database) = &cli.database {
        config.storage.database_path = database.clone();
    }
    if let Some(cache) = &cli.cache {
        config.storage.cache_path = cache.clone();
    }

    validate(&config)?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("legacy_populate=info,warn"),
            1 => EnvFilter::new("legacy_populate=debug,info"),
            2 => EnvFilter::new("legacy_populate=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
