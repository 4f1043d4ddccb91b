//! Tally CLI - Personal finance analytics
//!
//! Usage:
//!   tally analyze --snapshot FILE          Full report for the last three months
//!   tally report health --snapshot FILE    One section of the report
//!   tally config --show                    Thresholds in effect

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Analyze { input } => commands::cmd_analyze(cli.config.as_deref(), &input).await,
        Commands::Report { section, input } => {
            commands::cmd_report(cli.config.as_deref(), &section, &input).await
        }
        Commands::Config { show } => commands::cmd_config(cli.config.as_deref(), show),
    }
}
