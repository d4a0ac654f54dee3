//! Collaborator ports.
//!
//! The reconciler talks to the outside world only through these traits:
//! a secret store for credentials and a device API built from them.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CredentialError, DeviceError};
use crate::resource::SecretReference;
use crate::types::{ActuatorKind, Mode, SensorDevice, SensorType};

/// Device API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Resolves credentials from wherever secrets live.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Resolve the credentials a secret reference points at.
    async fn resolve(
        &self,
        secret_ref: &SecretReference,
        namespace: &str,
    ) -> Result<Credentials, CredentialError>;
}

/// Remote device API operations used by a reconciliation pass.
///
/// Implementations must be safe to call concurrently; the actuation fan-out
/// issues `set_temperature` for several devices at once.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Find the sensor device of the given type.
    async fn locate_sensor(&self, sensor_type: SensorType) -> Result<SensorDevice, DeviceError>;

    /// Read the current temperature in Celsius.
    async fn read_temperature(&self, sensor_id: &str) -> Result<f64, DeviceError>;

    /// List the IDs of every device of a kind. May be empty.
    async fn discover_actuators(&self, kind: ActuatorKind) -> Result<Vec<String>, DeviceError>;

    /// Command a device to hold a temperature in a mode.
    async fn set_temperature(
        &self,
        device_id: &str,
        value: f64,
        mode: Mode,
    ) -> Result<(), DeviceError>;
}

/// Builds a [`DeviceApi`] from credentials, once per pass.
pub trait DeviceApiFactory: Send + Sync {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns a [`CredentialError::ClientSetup`] when the credentials cannot
    /// be turned into a working client.
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn DeviceApi>, CredentialError>;
}
