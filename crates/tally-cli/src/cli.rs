//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Tally - Financial analytics for your expense history
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal finance analytics: trends, anomalies, forecasts and health score", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Analytics config file (defaults to the data dir override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every analyzer and print the full report
    Analyze {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print a single section of the report
    Report {
        /// Section: trends, recurring, anomalies, forecast, health, insights, patterns
        section: String,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Show the analytics configuration in effect
    Config {
        /// Print every threshold, not just the source
        #[arg(long)]
        show: bool,
    },
}

/// Where the data comes from and which period to analyze
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// JSON snapshot with expenses, budgets and goals
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Extra expenses from a CSV file (id,category,amount,date,...)
    #[arg(long)]
    pub expenses: Option<PathBuf>,

    /// Date treated as today (YYYY-MM-DD, defaults to the current date)
    #[arg(long)]
    pub anchor: Option<String>,

    /// Time period: this-month, last-month, last-3-months, last-30-days, last-90-days, this-year, last-12-months, all
    #[arg(long, default_value = "last-3-months")]
    pub period: String,

    /// Custom start date (YYYY-MM-DD) - overrides period
    #[arg(long)]
    pub from: Option<String>,

    /// Custom end date (YYYY-MM-DD) - overrides period
    #[arg(long)]
    pub to: Option<String>,

    /// Health score of the previous period (recomputed if omitted)
    #[arg(long)]
    pub previous_score: Option<f64>,

    /// Output JSON instead of text
    #[arg(long)]
    pub json: bool,
}
