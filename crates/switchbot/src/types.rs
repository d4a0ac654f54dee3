//! Wire types for the SwitchBot v1.1 API.

use serde::{Deserialize, Serialize};
use thermopilot_core::Mode;

/// API status code reported on success inside the response body.
pub const API_SUCCESS: i64 = 100;

/// Response of `GET /devices`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDeviceResponse {
    #[serde(default)]
    pub status_code: i64,
    #[serde(default)]
    pub body: DeviceListBody,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListBody {
    #[serde(default)]
    pub device_list: Vec<Device>,
    #[serde(default)]
    pub infrared_remote_list: Vec<InfraredRemote>,
}

/// A physical SwitchBot device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub enable_cloud_service: bool,
    #[serde(default)]
    pub hub_device_id: String,
}

/// A virtual infrared remote registered on a hub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfraredRemote {
    pub device_id: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub remote_type: String,
    #[serde(default)]
    pub hub_device_id: String,
}

/// Response of `GET /devices/{id}/status` for a meter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterStatusResponse {
    pub status_code: i64,
    #[serde(default)]
    pub body: MeterStatus,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeterStatus {
    /// Absent when the meter has not reported yet or the body is empty.
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// Body of `POST /devices/{id}/commands`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub command: String,
    pub parameter: String,
    pub command_type: String,
}

impl CommandRequest {
    /// `setAll` command: temperature, mode, fan speed auto, power on.
    #[must_use]
    pub fn set_all(temperature: f64, mode: AirConditionerMode) -> Self {
        Self {
            command: "setAll".to_string(),
            parameter: format!("{temperature:.0},{},1,on", mode.code()),
            command_type: "command".to_string(),
        }
    }
}

/// Response of `POST /devices/{id}/commands`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub status_code: i64,
    #[serde(default)]
    pub message: String,
}

/// Air conditioner modes accepted by `setAll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AirConditionerMode {
    Auto,
    Cool,
    Dry,
    Fan,
    Heat,
}

impl AirConditionerMode {
    /// Numeric code used in the `setAll` parameter.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Auto => 1,
            Self::Cool => 2,
            Self::Dry => 3,
            Self::Fan => 4,
            Self::Heat => 5,
        }
    }
}

impl From<Mode> for AirConditionerMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Cool => Self::Cool,
            Mode::Heat => Self::Heat,
        }
    }
}
