//! # Draft Board
//!
//! Command-line host for the scoring and VOR engines.

mod cli;
mod projections;
mod settings;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, CliHandler};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let handler = CliHandler::new(&cli).await?;
    handler.handle_command(cli.command).await?;

    Ok(())
}
