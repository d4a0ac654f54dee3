//! # ThermoPilot
//!
//! Reconciles room temperature against a declared target.
//!
//! ## Commands
//!
//! - `run` loads `thermopilot.toml` and reconciles every resource until Ctrl+C
//! - `validate` checks the config file without touching any device
//! - `decide` prints what the decision engine would do for one reading
//!
//! Logging goes through `tracing`; set `RUST_LOG` to change the level.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    commands::execute_command(cli.command).await
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
