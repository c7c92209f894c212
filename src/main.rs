//! Traktor Kontrol F1 Driver CLI
//!
//! Command-line front end for listing, monitoring and driving the controller.

use anyhow::Result;
use clap::Parser;

mod cli;
use cli::{Cli, Commands};

mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        None | Some(Commands::List) => commands::list::run(),
        Some(Commands::Monitor { json, capacity }) => commands::monitor::run(json, capacity).await,
        Some(Commands::Demo) => commands::demo::run().await,
        Some(Commands::Layout {
            hold_ms,
            refresh_hz,
        }) => commands::layout::run(hold_ms, refresh_hz).await,
    }
}
