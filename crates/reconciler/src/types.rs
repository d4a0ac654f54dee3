//! Core types for the reconciler.

use std::time::Duration;

use itertools::Itertools;
use serde::Serialize;
use thermopilot_core::{ConditionSet, Decision, ThermoPilotStatus};

use crate::error::ReconcileError;

/// Non-empty, ordered, duplicate-free set of actuator device IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActuatorSet {
    ids: Vec<String>,
}

impl ActuatorSet {
    /// The single explicitly configured actuator.
    pub fn single(id: impl Into<String>) -> Self {
        Self {
            ids: vec![id.into()],
        }
    }

    /// Build from discovered IDs, keeping first occurrences in order.
    ///
    /// Returns `None` when nothing was discovered.
    pub fn from_discovered(ids: impl IntoIterator<Item = String>) -> Option<Self> {
        let ids = ids
            .into_iter()
            .filter(|id| !id.is_empty())
            .unique()
            .collect_vec();
        (!ids.is_empty()).then_some(Self { ids })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Never true for a constructed set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// How a batch of device commands went as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuationVerdict {
    Succeeded,
    PartialFailure,
    AllFailed,
}

/// Per-device results of one actuation fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActuationReport {
    /// Devices that accepted the command.
    pub succeeded: Vec<String>,
    /// Devices that failed, with the error text, in actuator order.
    pub failed: Vec<(String, String)>,
}

impl ActuationReport {
    /// Create a new actuation report.
    pub fn new(succeeded: Vec<String>, failed: Vec<(String, String)>) -> Self {
        Self { succeeded, failed }
    }

    /// Get the total number of commands.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Get the number of failed commands.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    #[must_use]
    pub fn verdict(&self) -> ActuationVerdict {
        if self.failed.is_empty() {
            ActuationVerdict::Succeeded
        } else if self.succeeded.is_empty() {
            ActuationVerdict::AllFailed
        } else {
            ActuationVerdict::PartialFailure
        }
    }

    /// `failed to control k/N air conditioners: [id: error, ...]`
    #[must_use]
    pub fn failure_summary(&self) -> String {
        let details = self
            .failed
            .iter()
            .map(|(id, error)| format!("{id}: {error}"))
            .join(", ");
        format!(
            "failed to control {}/{} air conditioners: [{details}]",
            self.failed_count(),
            self.total()
        )
    }
}

/// Everything a single reconciliation pass produced.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Full condition set for this pass.
    pub conditions: ConditionSet,
    /// Formatted reading, set once the sensor was read.
    pub current_temperature: Option<String>,
    /// Delay before the next pass; `None` waits for a spec change.
    pub requeue_after: Option<Duration>,
    pub decision: Option<Decision>,
    pub actuation: Option<ActuationReport>,
    /// The error that ended the pass, if any.
    pub error: Option<ReconcileError>,
}

impl ReconcileOutcome {
    /// Check if the pass ended without a fatal error.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Write this outcome into a resource status.
    ///
    /// Conditions are replaced wholesale. The current temperature is only
    /// overwritten when this pass read one.
    pub fn apply_to(&self, status: &mut ThermoPilotStatus) {
        status.conditions = self.conditions.clone();
        if let Some(current) = &self.current_temperature {
            status.current_temperature = Some(current.clone());
        }
    }
}
