//! Desired-state resolution: textual spec fields into typed values.

use std::ops::RangeInclusive;

use serde::Serialize;
use tracing::warn;

use crate::error::{ConfigError, Result};
use crate::resource::ThermoPilotSpec;
use crate::types::{Mode, SensorType, parse_temperature};

/// Hysteresis threshold used when the spec leaves it unset or unusable.
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Target temperatures outside this range are treated as misconfiguration.
pub const PLAUSIBLE_TARGET_RANGE: RangeInclusive<f64> = 0.0..=40.0;

/// Thresholds above this leave the room effectively uncontrolled.
pub const PLAUSIBLE_THRESHOLD_MAX: f64 = 5.9;

/// Typed desired state for one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesiredState {
    pub target_temperature: f64,
    pub threshold: f64,
    pub mode: Mode,
    pub sensor_type: SensorType,
    pub explicit_actuator_id: Option<String>,
}

impl DesiredState {
    /// Resolve a spec into typed values.
    ///
    /// An unparsable or negative threshold is not an error: it falls back to
    /// [`DEFAULT_THRESHOLD`] and is logged. One above
    /// [`PLAUSIBLE_THRESHOLD_MAX`] is kept with a warning.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an unsupported sensor type or mode, or a
    /// target temperature that is malformed or out of range.
    pub fn resolve(spec: &ThermoPilotSpec) -> Result<Self> {
        let sensor_type: SensorType = spec.temperature_sensor_type.parse()?;
        let target_temperature = resolve_target(&spec.target_temperature)?;
        let threshold = spec
            .threshold
            .as_deref()
            .map_or(DEFAULT_THRESHOLD, |raw| match resolve_threshold(raw) {
                Ok(value) => {
                    if let Some(e) = implausible_threshold(value) {
                        warn!(error = %e, "Threshold kept but unlikely to trigger control");
                    }
                    value
                }
                Err(e) => {
                    warn!(error = %e, fallback = DEFAULT_THRESHOLD, "Ignoring threshold");
                    DEFAULT_THRESHOLD
                }
            });
        let mode: Mode = spec.mode.parse()?;

        Ok(Self {
            target_temperature,
            threshold,
            mode,
            sensor_type,
            explicit_actuator_id: spec.explicit_actuator().map(str::to_string),
        })
    }
}

/// Validate a spec the way an admission check would, collecting every problem.
///
/// Unlike [`DesiredState::resolve`], a bad threshold is reported here.
///
/// # Errors
///
/// Returns all problems found, in field order.
pub fn validate_spec(spec: &ThermoPilotSpec) -> std::result::Result<(), Vec<ConfigError>> {
    let problems: Vec<ConfigError> = [
        spec.secret_ref
            .name
            .is_empty()
            .then_some(ConfigError::MissingSecretName),
        spec.temperature_sensor_type.parse::<SensorType>().err(),
        resolve_target(&spec.target_temperature).err(),
        spec.threshold
            .as_deref()
            .and_then(|raw| match resolve_threshold(raw) {
                Ok(value) => implausible_threshold(value),
                Err(e) => Some(e),
            }),
        spec.mode.parse::<Mode>().err(),
    ]
    .into_iter()
    .flatten()
    .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

fn resolve_target(raw: &str) -> Result<f64> {
    let value = parse_temperature(raw)?;
    if PLAUSIBLE_TARGET_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::TargetOutOfRange {
            value,
            min: *PLAUSIBLE_TARGET_RANGE.start(),
            max: *PLAUSIBLE_TARGET_RANGE.end(),
        })
    }
}

fn resolve_threshold(raw: &str) -> Result<f64> {
    let value = parse_temperature(raw)?;
    if value < 0.0 {
        Err(ConfigError::NegativeThreshold { value })
    } else {
        Ok(value)
    }
}

fn implausible_threshold(value: f64) -> Option<ConfigError> {
    (value > PLAUSIBLE_THRESHOLD_MAX).then_some(ConfigError::ThresholdTooLarge {
        value,
        max: PLAUSIBLE_THRESHOLD_MAX,
    })
}
