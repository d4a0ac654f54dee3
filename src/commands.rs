//! CLI command handlers.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use thermopilot_core::{ConditionType, Mode, decide};
use thermopilot_reconciler::{
    InMemoryResourceStore, ReconcilerBuilder, ReconciliationLoop, ResourceStore,
};
use thermopilot_switchbot::SwitchBotConnector;
use tokio::signal;
use tracing::{error, info, warn};

use crate::cli::Commands;
use crate::config::AppConfig;

/// Execute a CLI command.
pub async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run { config } => cmd_run(&config).await,
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Decide {
            current,
            target,
            threshold,
            mode,
        } => cmd_decide(current, target, threshold, mode),
    }
}

/// Reconcile every configured resource until Ctrl+C.
async fn cmd_run(path: &Path) -> Result<()> {
    let config = AppConfig::load(path)?;
    for problem in config.problems() {
        warn!(problem = %problem, "Configuration problem");
    }

    let switchbot = config
        .switchbot
        .clone()
        .with_env_overrides()
        .context("invalid SwitchBot environment overrides")?;
    info!(base_url = %switchbot.base_url, "Using SwitchBot API");

    let reconciler = ReconcilerBuilder::new()
        .with_credentials(Arc::new(config.secret_store()))
        .with_devices(Arc::new(SwitchBotConnector::new(switchbot)))
        .with_config(config.reconciler.clone())
        .build()
        .context("failed to build reconciler")?;

    let store = Arc::new(InMemoryResourceStore::new());
    for resource in config.thermopilots() {
        store.apply(resource).await;
    }
    info!(resources = config.resources.len(), "Resources loaded");

    let runner = ReconciliationLoop::new(Arc::new(reconciler), store.clone());
    let stopper = runner.stopper();
    let handle = tokio::spawn(async move { runner.run().await });

    info!("ThermoPilot is running. Press Ctrl+C to stop.");
    wait_for_shutdown().await;
    stopper.stop();

    handle
        .await
        .context("reconciliation loop task failed")?
        .context("reconciliation loop failed")?;

    for key in store.keys().await? {
        if let Some(resource) = store.get(&key).await? {
            let available = resource
                .status
                .conditions
                .get(ConditionType::Available)
                .map(|c| format!("{} ({})", c.status, c.reason));
            info!(
                resource = %key,
                current_temperature = resource.status.current_temperature.as_deref(),
                available = available.as_deref(),
                "Final status"
            );
        }
    }

    info!("ThermoPilot stopped gracefully");
    Ok(())
}

/// Check a config file and every resource spec in it.
fn cmd_validate(path: &Path) -> Result<()> {
    let config = AppConfig::load(path)?;
    let problems = config.problems();

    if problems.is_empty() {
        println!(
            "{}: ok ({} resources, {} secrets)",
            path.display(),
            config.resources.len(),
            config.secrets.len()
        );
        return Ok(());
    }

    for problem in &problems {
        println!("{problem}");
    }
    bail!("{} problem(s) found in {}", problems.len(), path.display())
}

/// Print the decision for one reading.
fn cmd_decide(current: f64, target: f64, threshold: f64, mode: Mode) -> Result<()> {
    if !current.is_finite() || !target.is_finite() {
        bail!("temperatures must be finite numbers");
    }
    if !threshold.is_finite() || threshold < 0.0 {
        bail!("threshold must be a non-negative number, got {threshold}");
    }

    let decision = decide(current, target, threshold, mode);
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn wait_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
        Err(err) => error!("Failed to listen for shutdown signal: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_decide_rejects_negative_threshold() {
        assert!(cmd_decide(27.0, 25.0, -1.0, Mode::Cool).is_err());
        assert!(cmd_decide(f64::NAN, 25.0, 1.0, Mode::Cool).is_err());
        assert!(cmd_decide(27.0, 25.0, 1.0, Mode::Heat).is_ok());
    }

    #[test]
    fn test_validate_reports_problems() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(
            br#"
            [[resources]]
            name = "attic"
            [resources.spec]
            secretRef = { name = "" }
            temperatureSensorType = "MeterPro"
            targetTemperature = "25"
            mode = "auto"
            "#,
        )?;

        let err = cmd_validate(file.path()).err().map(|e| e.to_string());
        assert!(err.is_some_and(|e| e.starts_with("2 problem(s) found")));
        Ok(())
    }
}
