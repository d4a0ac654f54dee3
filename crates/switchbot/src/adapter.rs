//! [`DeviceApi`] implementation backed by [`SwitchBotClient`].

use std::sync::Arc;

use async_trait::async_trait;
use thermopilot_core::{
    ActuatorKind, CredentialError, Credentials, DeviceApi, DeviceApiFactory, DeviceError, Mode,
    SensorDevice, SensorType,
};
use tracing::debug;

use crate::client::SwitchBotClient;
use crate::config::SwitchBotConfig;

#[async_trait]
impl DeviceApi for SwitchBotClient {
    async fn locate_sensor(&self, sensor_type: SensorType) -> Result<SensorDevice, DeviceError> {
        let device = match sensor_type {
            SensorType::MeterPro => self.meter_pro().await?,
        };
        Ok(SensorDevice {
            device_id: device.device_id,
            device_name: device.device_name,
        })
    }

    async fn read_temperature(&self, sensor_id: &str) -> Result<f64, DeviceError> {
        Ok(self.temperature(sensor_id).await?)
    }

    async fn discover_actuators(&self, kind: ActuatorKind) -> Result<Vec<String>, DeviceError> {
        let remotes = match kind {
            ActuatorKind::AirConditioner => self.air_conditioners().await?,
        };
        Ok(remotes.into_iter().map(|remote| remote.device_id).collect())
    }

    async fn set_temperature(
        &self,
        device_id: &str,
        value: f64,
        mode: Mode,
    ) -> Result<(), DeviceError> {
        Ok(SwitchBotClient::set_temperature(self, device_id, value, mode.into()).await?)
    }
}

/// Builds a [`SwitchBotClient`] per pass from freshly resolved credentials.
#[derive(Debug, Clone, Default)]
pub struct SwitchBotConnector {
    config: SwitchBotConfig,
}

impl SwitchBotConnector {
    /// Create a connector that builds clients with this configuration.
    #[must_use]
    pub const fn new(config: SwitchBotConfig) -> Self {
        Self { config }
    }
}

impl DeviceApiFactory for SwitchBotConnector {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn DeviceApi>, CredentialError> {
        debug!(base_url = %self.config.base_url, "Building SwitchBot client");
        let client = SwitchBotClient::new(self.config.clone(), credentials.clone())?;
        Ok(Arc::new(client))
    }
}
