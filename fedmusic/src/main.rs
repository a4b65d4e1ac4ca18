//! FedMusic command-line front end
//!
//! Builds the provider adapters and the aggregation engine from the
//! configuration, runs one command and prints its result as JSON.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use fedconfig::{Config, get_config};
use fedengine::{Aggregator, ConfigStore, EngineConfigExt};
use fedproviders::{ProvidersConfigExt, default_adapters};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays valid JSON
fn init_logging(config: &Config) -> Result<()> {
    if !config.get_log_enable_console()? {
        return Ok(());
    }
    let default_level = config.get_log_min_level()?.to_lowercase();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(dir) => Arc::new(Config::load_config(dir)?),
        None => get_config(),
    };
    init_logging(&config)?;
    info!(config_file = %config.file_path(), "Configuration loaded");

    let adapters = default_adapters(&config.get_providers_settings()?)?;
    let engine = Aggregator::builder()
        .adapters(adapters)
        .settings(config.get_engine_settings()?)
        .store(Arc::new(ConfigStore::new(config.clone())))
        .build();

    let output = cli::run(&engine, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
