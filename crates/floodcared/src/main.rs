//! FloodCare Daemon - flood emergency report triage and sync
//!
//! Owns the report store, polls the school spreadsheet, and serves the JSON
//! API that floodctl and the dashboards talk to.

use anyhow::{Context, Result};
use clap::Parser;
use floodcare_common::cache::LocalCache;
use floodcare_common::config::FloodConfig;
use floodcared::server::{self, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "floodcared")]
#[command(about = "FloodCare daemon - report triage, sheet sync and JSON API", long_about = None)]
#[command(version = floodcare_common::VERSION)]
struct Args {
    /// Write the default config to PATH and exit
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,

    /// Remove cached reports and announcements before starting
    #[arg(long)]
    clear_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Some(path) = args.write_default_config {
        return FloodConfig::save_default(&path);
    }

    info!("FloodCare Daemon v{} starting", floodcare_common::VERSION);

    let config = FloodConfig::load();
    if args.clear_cache {
        let cache = LocalCache::new(config.data_dir());
        cache.clear_all().context("Failed to clear cache")?;
        info!("  Cleared cache in {}", cache.dir().display());
    }

    let state = Arc::new(AppState::from_config(&config)?);

    // The first tick syncs immediately
    let (stop_tx, stop_rx) = watch::channel(false);
    let sync_task = tokio::spawn(state.sync.clone().run(stop_rx));

    info!("FloodCare Daemon ready");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutting down gracefully");
    };
    let served = server::run(state, &config.service.bind, shutdown).await;

    let _ = stop_tx.send(true);
    if let Err(e) = sync_task.await {
        error!("Sync loop ended abnormally: {}", e);
    }

    served
}
