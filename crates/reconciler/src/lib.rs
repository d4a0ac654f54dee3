//! K8s-style reconciliation of ThermoPilot resources.
//!
//! Each pass drives a room toward its target temperature:
//!
//! - **Observe**: resolve credentials, locate the sensor, read the temperature
//! - **Decide**: run the pure decision engine from `thermopilot-core`
//! - **Act**: resolve air conditioners and fan the command out to all of them
//! - **Project**: write a full Available/Progressing/Degraded condition set
//!
//! # Requeue
//!
//! | Outcome | Requeue |
//! |---|---|
//! | completed, including partial actuation failure | 5 min |
//! | credential error | 5 min |
//! | sensor, discovery or all-devices-failed error | 1 min |
//! | config error | none, waits for a spec change |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use thermopilot_reconciler::{
//!     InMemoryResourceStore, InMemorySecretStore, ReconcilerBuilder, ReconciliationLoop,
//! };
//! use thermopilot_switchbot::{SwitchBotConfig, SwitchBotConnector};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let reconciler = ReconcilerBuilder::new()
//!         .with_credentials(Arc::new(InMemorySecretStore::new()))
//!         .with_devices(Arc::new(SwitchBotConnector::new(SwitchBotConfig::default())))
//!         .build()?;
//!
//!     let store = Arc::new(InMemoryResourceStore::new());
//!     let runner = ReconciliationLoop::new(Arc::new(reconciler), store);
//!     runner.run().await?;
//!     Ok(())
//! }
//! ```

#![forbid(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod actuators;
pub mod credentials;
pub mod error;
pub mod fanout;
pub mod r#loop;
pub mod reconciler;
pub mod status;
pub mod types;

#[cfg(test)]
mod fake;

// Re-export main types
pub use actuators::resolve_actuators;
pub use credentials::InMemorySecretStore;
pub use error::{Error, ReconcileError, Result};
pub use fanout::fan_out;
pub use r#loop::{InMemoryResourceStore, LoopStopper, ReconciliationLoop, ResourceStore};
pub use reconciler::{Reconciler, ReconcilerBuilder, ReconcilerConfig};
pub use status::StatusProjector;
pub use types::{ActuationReport, ActuationVerdict, ActuatorSet, ReconcileOutcome};
