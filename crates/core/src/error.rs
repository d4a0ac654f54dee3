//! Core error types for ThermoPilot.
//!
//! Each collaborator boundary gets its own typed error so the reconciler can
//! map failures onto condition reasons and requeue intervals without string
//! matching.

use thiserror::Error;

/// Result type for desired-state resolution.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Static misconfiguration of a ThermoPilot spec.
///
/// These are terminal: retrying will not help until a human edits the spec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid temperature format: {raw}")]
    InvalidTemperature { raw: String },

    #[error("target temperature {value} outside plausible range {min:.1}..={max:.1}")]
    TargetOutOfRange { value: f64, min: f64, max: f64 },

    #[error("unsupported temperature sensor type: {value}")]
    UnsupportedSensorType { value: String },

    #[error("unsupported mode: {value}")]
    UnsupportedMode { value: String },

    #[error("threshold must not be negative: {value}")]
    NegativeThreshold { value: f64 },

    #[error("threshold {value} above plausible maximum {max}")]
    ThresholdTooLarge { value: f64, max: f64 },

    #[error("secretRef.name must not be empty")]
    MissingSecretName,
}

impl ConfigError {
    /// Create an invalid temperature format error.
    pub fn invalid_temperature(raw: impl Into<String>) -> Self {
        Self::InvalidTemperature { raw: raw.into() }
    }

    /// Create an unsupported sensor type error.
    pub fn unsupported_sensor_type(value: impl Into<String>) -> Self {
        Self::UnsupportedSensorType {
            value: value.into(),
        }
    }

    /// Create an unsupported mode error.
    pub fn unsupported_mode(value: impl Into<String>) -> Self {
        Self::UnsupportedMode {
            value: value.into(),
        }
    }
}

/// Failure reported by the remote device API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The requested device does not exist in the account.
    #[error("{what} not found")]
    NotFound { what: String },

    /// The request never produced a usable response.
    #[error("request failed: {reason}")]
    Request { reason: String },

    /// The API answered but refused the operation.
    #[error("unexpected status code: {status}, message: {message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("invalid response: {reason}")]
    Decode { reason: String },

    /// The call did not finish within its deadline.
    #[error("timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl DeviceError {
    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a request error.
    pub fn request(reason: impl Into<String>) -> Self {
        Self::Request {
            reason: reason.into(),
        }
    }

    /// Create a rejected-by-api error.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }
}

/// Failure resolving device API credentials from the secret store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("failed to get secret {name}: {reason}")]
    SecretUnavailable { name: String, reason: String },

    #[error("{kind} key '{key}' not found in secret {name}")]
    KeyMissing {
        kind: &'static str,
        key: String,
        name: String,
    },

    #[error("{kind} value is empty in secret {name}")]
    EmptyValue { kind: &'static str, name: String },

    #[error("failed to build device api client: {reason}")]
    ClientSetup { reason: String },
}

impl CredentialError {
    /// Create a secret unavailable error.
    pub fn secret_unavailable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SecretUnavailable {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a client setup error.
    pub fn client_setup(reason: impl Into<String>) -> Self {
        Self::ClientSetup {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages_name_the_raw_value() {
        assert_eq!(
            ConfigError::invalid_temperature("warm").to_string(),
            "invalid temperature format: warm"
        );
        assert_eq!(
            ConfigError::unsupported_mode("auto").to_string(),
            "unsupported mode: auto"
        );
        assert_eq!(
            ConfigError::unsupported_sensor_type("Hub2").to_string(),
            "unsupported temperature sensor type: Hub2"
        );
    }

    #[test]
    fn test_device_error_not_found() {
        let err = DeviceError::not_found("meter pro");
        assert_eq!(err.to_string(), "meter pro not found");
    }

    #[test]
    fn test_credential_key_missing() {
        let err = CredentialError::KeyMissing {
            kind: "token",
            key: "token".to_string(),
            name: "switchbot".to_string(),
        };
        assert!(err.to_string().contains("token key 'token' not found"));
    }
}
