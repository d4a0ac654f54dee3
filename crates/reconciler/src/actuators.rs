//! Actuator resolution: explicit device or discovery.

use thermopilot_core::{ActuatorKind, DeviceApi};
use tracing::{debug, info};

use crate::error::ReconcileError;
use crate::types::ActuatorSet;

/// Resolve which devices receive this pass's command.
///
/// An explicit device ID short-circuits discovery entirely.
///
/// # Errors
///
/// Returns [`ReconcileError::ActuatorDiscovery`] when discovery fails or finds
/// nothing.
pub async fn resolve_actuators(
    api: &dyn DeviceApi,
    explicit: Option<&str>,
    kind: ActuatorKind,
) -> Result<ActuatorSet, ReconcileError> {
    if let Some(id) = explicit {
        debug!(device_id = id, "Using explicit actuator");
        return Ok(ActuatorSet::single(id));
    }

    let discovered = api
        .discover_actuators(kind)
        .await
        .map_err(|e| ReconcileError::actuator_discovery(e.to_string()))?;

    let set = ActuatorSet::from_discovered(discovered).ok_or_else(|| {
        let kind = kind.to_string().to_lowercase();
        ReconcileError::actuator_discovery(format!("{kind} not found"))
    })?;

    info!(kind = %kind, count = set.len(), "Discovered actuators");
    Ok(set)
}
