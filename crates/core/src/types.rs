//! Small value types shared across the workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Operating mode of the controlled space, and the mode sent to devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Cool,
    Heat,
}

impl Mode {
    /// Wire name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cool => "cool",
            Self::Heat => "heat",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cool" => Ok(Self::Cool),
            "heat" => Ok(Self::Heat),
            other => Err(ConfigError::unsupported_mode(other)),
        }
    }
}

/// Supported temperature sensor models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorType {
    MeterPro,
}

impl SensorType {
    /// Device type string reported by the device API.
    #[must_use]
    pub const fn device_type(self) -> &'static str {
        match self {
            Self::MeterPro => "MeterPro",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.device_type())
    }
}

impl FromStr for SensorType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MeterPro" => Ok(Self::MeterPro),
            other => Err(ConfigError::unsupported_sensor_type(other)),
        }
    }
}

/// Kinds of actuator the device API can discover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActuatorKind {
    AirConditioner,
}

impl ActuatorKind {
    /// Remote type string reported by the device API.
    #[must_use]
    pub const fn remote_type(self) -> &'static str {
        match self {
            Self::AirConditioner => "Air Conditioner",
        }
    }
}

impl fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.remote_type())
    }
}

/// A sensor device located through the device API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorDevice {
    pub device_id: String,
    pub device_name: String,
}

/// Parse a decimal temperature string.
///
/// Surrounding whitespace is ignored. `NaN` and infinities are rejected.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTemperature`] carrying the raw input.
pub fn parse_temperature(raw: &str) -> Result<f64, ConfigError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ConfigError::invalid_temperature(raw))
}

/// Format a temperature with one decimal place, e.g. `24.3`.
#[must_use]
pub fn format_temperature(value: f64) -> String {
    format!("{value:.1}")
}
