//! CLI interface for trade-warden
//!
//! Provides subcommands for:
//! - `setup`: Create a risk-sized trade, optionally execute and monitor it
//! - `stats`: Summarize the trade journal
//! - `config`: Show effective configuration

mod setup;
mod stats;

pub use setup::SetupArgs;
pub use stats::StatsArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "trade-warden")]
#[command(about = "Risk-bounded trade lifecycle engine with automated SL/target monitoring")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a risk-sized trade, optionally execute and monitor it
    Setup(SetupArgs),
    /// Summarize the trade journal
    Stats(StatsArgs),
    /// Show effective configuration
    Config,
}
