//! Reconciler implementation.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thermopilot_core::{
    ActuatorKind, CredentialSource, Decision, DesiredState, DeviceApiFactory, ThermoPilot, decide,
    format_temperature,
};
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::actuators::resolve_actuators;
use crate::error::{Error, ReconcileError, Result};
use crate::fanout::{fan_out, within};
use crate::status::StatusProjector;
use crate::types::{ActuationReport, ActuationVerdict, ReconcileOutcome};

/// Configuration for the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Requeue after a completed pass, including partial actuation failure.
    #[serde(rename = "steady_requeue_secs", with = "duration_secs")]
    pub steady_interval: Duration,
    /// Requeue after sensor, discovery or all-devices-failed errors.
    #[serde(rename = "retry_requeue_secs", with = "duration_secs")]
    pub retry_interval: Duration,
    /// Requeue after a credential error.
    #[serde(rename = "credential_requeue_secs", with = "duration_secs")]
    pub credential_retry_interval: Duration,
    /// Deadline for a single device call: sensor lookup, reading, discovery
    /// or command.
    #[serde(rename = "command_timeout_secs", with = "duration_secs")]
    pub command_timeout: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            steady_interval: Duration::from_secs(5 * 60),
            retry_interval: Duration::from_secs(60),
            credential_retry_interval: Duration::from_secs(5 * 60),
            command_timeout: Duration::from_secs(15),
        }
    }
}

impl ReconcilerConfig {
    /// Reject zero durations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first zero field.
    pub fn validate(&self) -> Result<()> {
        [
            ("steady_requeue_secs", self.steady_interval),
            ("retry_requeue_secs", self.retry_interval),
            ("credential_requeue_secs", self.credential_retry_interval),
            ("command_timeout_secs", self.command_timeout),
        ]
        .into_iter()
        .find(|(_, value)| value.is_zero())
        .map_or(Ok(()), |(name, _)| {
            Err(Error::invalid_config(format!("{name} must be positive")))
        })
    }
}

/// Values a pass has produced so far, kept even when a later stage fails.
#[derive(Debug, Default)]
struct PassState {
    current_temperature: Option<String>,
    decision: Option<Decision>,
    actuation: Option<ActuationReport>,
}

/// K8s-style reconciler for a single ThermoPilot resource.
pub struct Reconciler {
    /// Resolves API credentials once per pass.
    credentials: Arc<dyn CredentialSource>,
    /// Builds the device client from those credentials.
    devices: Arc<dyn DeviceApiFactory>,
    /// Configuration.
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a new reconciler.
    pub fn new(
        credentials: Arc<dyn CredentialSource>,
        devices: Arc<dyn DeviceApiFactory>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            credentials,
            devices,
            config,
        }
    }

    /// Run one pass: observe, decide, act, and project status.
    ///
    /// Never fails as a call; a failed pass is described by
    /// [`ReconcileOutcome::error`] and the conditions it carries.
    pub async fn reconcile(&self, resource: &ThermoPilot) -> ReconcileOutcome {
        let key = resource.key();
        info!(resource = %key, generation = resource.generation, "Starting reconciliation");

        let mut pass = PassState::default();
        let result = self.run_pass(resource, &mut pass).await;

        let projector = StatusProjector::new(resource.generation);
        let (conditions, requeue_after) = match &result {
            Ok(decision) => {
                info!(
                    resource = %key,
                    action = %decision.action,
                    requeue_secs = self.config.steady_interval.as_secs(),
                    "Reconciliation complete"
                );
                (
                    projector.completed(decision, pass.actuation.as_ref()),
                    Some(self.config.steady_interval),
                )
            }
            Err(e) => {
                let requeue_after = e.requeue_after(&self.config);
                error!(
                    resource = %key,
                    reason = e.reason(),
                    error = %e,
                    requeue_secs = requeue_after.map(|d| d.as_secs()),
                    "Reconciliation failed"
                );
                (projector.failed(e, pass.decision.as_ref()), requeue_after)
            }
        };

        ReconcileOutcome {
            conditions: conditions.carry_transitions(&resource.status.conditions),
            current_temperature: pass.current_temperature,
            requeue_after,
            decision: pass.decision,
            actuation: pass.actuation,
            error: result.err(),
        }
    }

    async fn run_pass(
        &self,
        resource: &ThermoPilot,
        pass: &mut PassState,
    ) -> std::result::Result<Decision, ReconcileError> {
        let credentials = self
            .credentials
            .resolve(&resource.spec.secret_ref, &resource.namespace)
            .await?;
        let api = self.devices.connect(&credentials)?;
        let desired = DesiredState::resolve(&resource.spec)?;

        let deadline = self.config.command_timeout;
        let sensor = within(deadline, api.locate_sensor(desired.sensor_type))
            .await
            .map_err(|source| ReconcileError::SensorNotFound { source })?;
        let current = within(deadline, api.read_temperature(&sensor.device_id))
            .await
            .map_err(|source| ReconcileError::Sensor { source })?;
        pass.current_temperature = Some(format_temperature(current));

        let decision = decide(
            current,
            desired.target_temperature,
            desired.threshold,
            desired.mode,
        );
        pass.decision = Some(decision);
        info!(
            sensor = %sensor.device_id,
            current,
            target = desired.target_temperature,
            threshold = desired.threshold,
            action = %decision.action,
            "Temperature evaluated"
        );

        if !decision.needs_action() {
            return Ok(decision);
        }

        info!(
            action = %decision.action,
            adjusted_target = decision.adjusted_target,
            mode = %decision.device_mode,
            "Performing action"
        );
        let actuators = timeout(
            deadline,
            resolve_actuators(
                api.as_ref(),
                desired.explicit_actuator_id.as_deref(),
                ActuatorKind::AirConditioner,
            ),
        )
        .await
        .unwrap_or_else(|_| {
            Err(ReconcileError::actuator_discovery(format!(
                "discovery timed out after {}ms",
                deadline.as_millis()
            )))
        })?;
        let report = fan_out(
            api.as_ref(),
            &actuators,
            decision.adjusted_target,
            decision.device_mode,
            deadline,
        )
        .await;

        let verdict = report.verdict();
        let failure = ReconcileError::Actuation {
            failed: report.failed_count(),
            total: report.total(),
            message: report.failure_summary(),
        };
        pass.actuation = Some(report);

        match verdict {
            ActuationVerdict::Succeeded => Ok(decision),
            ActuationVerdict::PartialFailure => {
                warn!(error = %failure, "Some air conditioners were not controlled");
                Ok(decision)
            }
            ActuationVerdict::AllFailed => Err(failure),
        }
    }

}

/// Builder for Reconciler.
pub struct ReconcilerBuilder {
    credentials: Option<Arc<dyn CredentialSource>>,
    devices: Option<Arc<dyn DeviceApiFactory>>,
    config: ReconcilerConfig,
}

impl ReconcilerBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            credentials: None,
            devices: None,
            config: ReconcilerConfig::default(),
        }
    }

    /// Set the credential source.
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the device client factory.
    pub fn with_devices(mut self, devices: Arc<dyn DeviceApiFactory>) -> Self {
        self.devices = Some(devices);
        self
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the per-command timeout.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout = timeout;
        self
    }

    /// Build the reconciler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when a collaborator is missing or the
    /// configuration has a zero duration.
    pub fn build(self) -> Result<Reconciler> {
        let credentials = self
            .credentials
            .ok_or_else(|| Error::invalid_config("Credential source is required"))?;

        let devices = self
            .devices
            .ok_or_else(|| Error::invalid_config("Device API factory is required"))?;

        self.config.validate()?;

        Ok(Reconciler::new(credentials, devices, self.config))
    }
}

impl Default for ReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialization helper for Duration as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
