//! Actuation fan-out: one command per device, all awaited together.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use itertools::{Either, Itertools};
use thermopilot_core::{DeviceApi, DeviceError, Mode};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::types::{ActuationReport, ActuatorSet};

/// Await a device call, failing with [`DeviceError::Timeout`] past `deadline`.
pub(crate) async fn within<T>(
    deadline: Duration,
    call: impl Future<Output = Result<T, DeviceError>>,
) -> Result<T, DeviceError> {
    timeout(deadline, call).await.unwrap_or_else(|_| {
        Err(DeviceError::Timeout {
            timeout_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        })
    })
}

/// Send `set_temperature` to every device and collect each outcome.
///
/// Commands run concurrently and never short-circuit: a failed or timed-out
/// device does not cancel the others. Failures keep actuator order.
pub async fn fan_out(
    api: &dyn DeviceApi,
    actuators: &ActuatorSet,
    target: f64,
    mode: Mode,
    command_timeout: Duration,
) -> ActuationReport {
    let commands = actuators.iter().map(|device_id| async move {
        let result = within(command_timeout, api.set_temperature(device_id, target, mode)).await;
        (device_id, result)
    });

    let (succeeded, failed) = join_all(commands)
        .await
        .into_iter()
        .partition_map(|(device_id, result)| match result {
            Ok(()) => {
                info!(device_id, target, mode = %mode, "Air conditioner controlled");
                Either::Left(device_id.to_string())
            }
            Err(e) => {
                warn!(device_id, error = %e, "Failed to control air conditioner");
                Either::Right((device_id.to_string(), e.to_string()))
            }
        });

    ActuationReport::new(succeeded, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeDevices;
    use crate::types::ActuationVerdict;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    const TIMEOUT: Duration = Duration::from_millis(50);

    fn actuators(ids: &[&str]) -> std::result::Result<ActuatorSet, &'static str> {
        ActuatorSet::from_discovered(ids.iter().map(ToString::to_string)).ok_or("no actuators")
    }

    #[tokio::test]
    async fn test_every_device_receives_the_command() -> TestResult {
        let api = FakeDevices::new(27.0, &[]);
        let set = actuators(&["ac-1", "ac-2", "ac-3"])?;

        let report = fan_out(&api, &set, 25.0, Mode::Cool, TIMEOUT).await;

        assert_eq!(report.verdict(), ActuationVerdict::Succeeded);
        assert_eq!(report.succeeded, vec!["ac-1", "ac-2", "ac-3"]);
        let commands = api.commands.lock().await;
        assert_eq!(commands.len(), 3);
        assert!(commands
            .iter()
            .all(|(_, value, mode)| (*value - 25.0).abs() < f64::EPSILON && *mode == Mode::Cool));
        Ok(())
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() -> TestResult {
        let api = FakeDevices::new(27.0, &[]).failing("ac-2", DeviceError::request("reset"));
        let set = actuators(&["ac-1", "ac-2", "ac-3"])?;

        let report = fan_out(&api, &set, 25.0, Mode::Cool, TIMEOUT).await;

        assert_eq!(report.verdict(), ActuationVerdict::PartialFailure);
        assert_eq!(report.succeeded, vec!["ac-1", "ac-3"]);
        assert_eq!(
            report.failed,
            vec![("ac-2".to_string(), "request failed: reset".to_string())]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_hanging_device_times_out() -> TestResult {
        let api = FakeDevices::new(27.0, &[]).hanging("ac-2");
        let set = actuators(&["ac-1", "ac-2"])?;

        let report = fan_out(&api, &set, 25.0, Mode::Cool, TIMEOUT).await;

        assert_eq!(report.succeeded, vec!["ac-1"]);
        assert_eq!(
            report.failed,
            vec![("ac-2".to_string(), "timed out after 50ms".to_string())]
        );
        Ok(())
    }
}
