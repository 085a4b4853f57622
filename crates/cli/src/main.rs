// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rlock - resource lock leader election

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::simulate;

#[derive(Parser)]
#[command(
    name = "rlock",
    version,
    about = "Leader election over versioned store objects"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run several contenders against one in-memory lock
    Simulate(simulate::SimulateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    match cli.command {
        Commands::Simulate(args) => simulate::handle(args).await,
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`)
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
