//! CLI command definitions using clap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thermopilot_core::{DEFAULT_THRESHOLD, Mode};

/// ThermoPilot - room temperature controller
#[derive(Parser, Debug)]
#[command(name = "thermopilot")]
#[command(version)]
#[command(about = "Keeps rooms at their target temperature with SwitchBot air conditioners")]
#[command(
    long_about = "ThermoPilot reads a SwitchBot Meter Pro, decides whether the room is too warm or too cold, and commands every air conditioner registered on the hub. Each resource is reconciled on its own schedule until interrupted."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile every configured resource until Ctrl+C
    Run {
        /// Config file path
        #[arg(short, long, default_value = "thermopilot.toml")]
        config: PathBuf,
    },

    /// Check a config file and every resource spec in it
    Validate {
        /// Config file path
        #[arg(short, long, default_value = "thermopilot.toml")]
        config: PathBuf,
    },

    /// Print the decision for a single reading as JSON
    Decide {
        /// Current temperature in Celsius
        #[arg(long, allow_hyphen_values = true)]
        current: f64,

        /// Target temperature in Celsius
        #[arg(long, allow_hyphen_values = true)]
        target: f64,

        /// Dead band around the target
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,

        /// Operating mode (cool, heat)
        #[arg(short, long)]
        mode: Mode,
    },
}
