//! Command-line front end for the storefront fetch layer.
//!
//! Useful for poking the admin API with the same timeout, retry and cache
//! behaviour the storefront uses. Cache commands are only meaningful with the
//! file backend, since the memory backend does not outlive the process.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;

use storefront_fetch::config::validation::validate_config;
use storefront_fetch::config::{parse_config, ConfigError, StorefrontConfig};
use storefront_fetch::observability::logging::init_logging;
use storefront_fetch::{CachedFetchOptions, StorefrontClient};

#[derive(Parser)]
#[command(name = "storefront-fetch")]
#[command(about = "Fetch and cache storefront data from the admin API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override api.base_url
    #[arg(short, long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one URL through the cache
    Get {
        url: String,
        /// Cache TTL in milliseconds (defaults to cache.default_ttl_ms)
        #[arg(long)]
        ttl_ms: Option<u64>,
        /// Skip the cache and fetch with retries only
        #[arg(long)]
        no_cache: bool,
    },
    /// Fetch several URLs concurrently; fails if any one fails
    Parallel {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Inspect or clear cached entries
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Print the cached payload for a key
    Show { key: String },
    /// Remove one key, or every key when none is given
    Clear { key: Option<String> },
}

fn load(cli: &Cli) -> Result<StorefrontConfig, ConfigError> {
    let content = match &cli.config {
        Some(path) => std::fs::read_to_string(path)?,
        None => String::new(),
    };
    let mut config = parse_config(&content)?;

    if let Some(base_url) = &cli.base_url {
        config.api.base_url = Some(base_url.clone());
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;
    init_logging(&config.observability);

    tracing::debug!(
        base_url = ?config.api.base_url,
        backend = ?config.cache.backend,
        timeout_ms = config.fetch.timeout_ms,
        max_retries = config.fetch.max_retries,
        "Configuration loaded"
    );

    let client = StorefrontClient::from_config(&config)?;
    let policy = client.policy().clone();

    match cli.command {
        Commands::Get { url, ttl_ms, no_cache } => {
            let data: Value = if no_cache {
                client.fetch_with_retry(&url, &policy).await?
            } else {
                let mut options = CachedFetchOptions::default();
                if let Some(ttl_ms) = ttl_ms {
                    options = options.ttl(Duration::from_millis(ttl_ms));
                }
                client.cached_fetch(&url, options).await?
            };
            print_json(&data)?;
        }
        Commands::Parallel { urls } => {
            let results: Vec<Value> = client.fetch_parallel(&urls, &policy).await?;
            print_json(&Value::Array(results))?;
        }
        Commands::Cache { command } => match command {
            CacheCommands::Show { key } => match client.get_cached_data::<Value>(&key) {
                Some(data) => print_json(&data)?,
                None => eprintln!("No valid cache entry for {key}"),
            },
            CacheCommands::Clear { key: Some(key) } => client.clear_cache(&key),
            CacheCommands::Clear { key: None } => client.clear_all_cache(),
        },
    }

    Ok(())
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
