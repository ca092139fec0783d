//! FloodCare Control - CLI client for floodcared
//!
//! Reporters send reports and SOS signals; staff work the priority queue
//! and post announcements.

use clap::Parser;
use floodctl::cli::Cli;
use floodctl::commands;
use floodctl::display;
use floodctl::errors::{EXIT_SUCCESS, EXIT_USAGE};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Quiet by default; RUST_LOG=debug shows every request
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS });
        }
    };

    if let Err(e) = commands::run(cli).await {
        display::failure(&e.to_string());
        std::process::exit(e.exit_code());
    }
}
