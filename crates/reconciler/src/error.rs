//! Error types for the reconciler crate.

use std::fmt;
use std::time::Duration;

use thermopilot_core::{ConfigError, CredentialError, DeviceError};
use thiserror::Error;

use crate::reconciler::ReconcilerConfig;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from wiring and running the reconciler, as opposed to a failed pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Resource not present in the store.
    ResourceNotFound { key: String },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceNotFound { key } => {
                write!(f, "resource '{key}' not found")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a resource not found error.
    pub fn resource_not_found(key: impl Into<String>) -> Self {
        Self::ResourceNotFound { key: key.into() }
    }

    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// The first failure of a reconciliation pass.
///
/// A pass stops at the first of these; the variant alone decides the
/// `Available` reason and the requeue interval.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("{source}")]
    SensorNotFound { source: DeviceError },

    #[error("{source}")]
    Sensor { source: DeviceError },

    #[error("{reason}")]
    ActuatorDiscovery { reason: String },

    /// Every device in the actuator set rejected its command.
    #[error("{message}")]
    Actuation {
        failed: usize,
        total: usize,
        message: String,
    },
}

impl ReconcileError {
    /// Create an actuator discovery error.
    pub fn actuator_discovery(reason: impl Into<String>) -> Self {
        Self::ActuatorDiscovery {
            reason: reason.into(),
        }
    }

    /// Reason token written to the `Available` condition.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::Credentials(_) => "CredentialsError",
            Self::SensorNotFound { .. } => "TemperatureSensorNotFound",
            Self::Sensor { .. } => "TemperatureSensorError",
            Self::ActuatorDiscovery { .. } => "AirConditionerListError",
            Self::Actuation { .. } => "AirConditionerControlError",
        }
    }

    /// Delay before the next pass. `None` means wait for a spec change.
    #[must_use]
    pub const fn requeue_after(&self, config: &ReconcilerConfig) -> Option<Duration> {
        match self {
            Self::Config(_) => None,
            Self::Credentials(_) => Some(config.credential_retry_interval),
            Self::SensorNotFound { .. }
            | Self::Sensor { .. }
            | Self::ActuatorDiscovery { .. }
            | Self::Actuation { .. } => Some(config.retry_interval),
        }
    }

    /// True for errors raised after the decision was made.
    #[must_use]
    pub const fn is_actuation_stage(&self) -> bool {
        matches!(self, Self::ActuatorDiscovery { .. } | Self::Actuation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::resource_not_found("home/living-room");
        assert_eq!(err.to_string(), "resource 'home/living-room' not found");
        assert!(Error::invalid_config("zero interval")
            .to_string()
            .contains("zero interval"));
    }

    #[test]
    fn test_requeue_precedence() {
        let config = ReconcilerConfig::default();
        let cases = [
            (
                ReconcileError::from(ConfigError::unsupported_mode("auto")),
                None,
            ),
            (
                ReconcileError::from(CredentialError::secret_unavailable("creds", "gone")),
                Some(Duration::from_secs(300)),
            ),
            (
                ReconcileError::SensorNotFound {
                    source: DeviceError::not_found("meter pro"),
                },
                Some(Duration::from_secs(60)),
            ),
            (
                ReconcileError::Sensor {
                    source: DeviceError::request("connection reset"),
                },
                Some(Duration::from_secs(60)),
            ),
            (
                ReconcileError::actuator_discovery("air conditioner not found"),
                Some(Duration::from_secs(60)),
            ),
            (
                ReconcileError::Actuation {
                    failed: 2,
                    total: 2,
                    message: "failed to control 2/2 air conditioners".to_string(),
                },
                Some(Duration::from_secs(60)),
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.requeue_after(&config), expected, "{err}");
        }
    }

    #[test]
    fn test_messages_pass_through() {
        let err = ReconcileError::from(ConfigError::unsupported_mode("auto"));
        assert_eq!(err.to_string(), "unsupported mode: auto");
        assert_eq!(err.reason(), "ConfigError");

        let err = ReconcileError::SensorNotFound {
            source: DeviceError::not_found("meter pro"),
        };
        assert_eq!(err.to_string(), "meter pro not found");
    }
}
