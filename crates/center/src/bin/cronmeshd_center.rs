// SPDX-License-Identifier: MIT

//! `cronmeshd-center`: loads a TOML config and serves the Event Channel
//! every agent in the organization dials into.

use anyhow::{Context, Result};
use clap::Parser;
use cronmesh_center::{Center, InMemoryTaskStore};
use cronmesh_core::CenterConfig;
use cronmesh_registry::InMemoryRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cronmeshd-center", about = "cronmesh control-plane process")]
struct Args {
    /// Path to the center's TOML config file. Defaults to
    /// `<config dir>/cronmesh/center.toml` when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Falls back to the platform config directory (`~/.config/cronmesh` on
/// Linux) when `--config` is not given.
fn default_config_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("cronmesh").join("center.toml")
}

fn init_tracing(log_level: &str) {
    let level = cronmesh_center::env::log_level().unwrap_or_else(|| log_level.to_string());
    let filter = if level.is_empty() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new(level)
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(default_config_path);
    let mut config = CenterConfig::load(&config_path).with_context(|| format!("loading {config_path:?}"))?;
    if let Some(address) = cronmesh_center::env::listen_address() {
        config.listen_address = address;
    }
    init_tracing(&config.log_level);

    let registry = Arc::new(InMemoryRegistry::new());
    let task_store = Arc::new(InMemoryTaskStore::new());
    let center = Arc::new(Center::new(config, registry, task_store));

    cronmesh_center::serve(center).await?;
    Ok(())
}
