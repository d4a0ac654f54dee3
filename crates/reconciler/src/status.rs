//! Status projection: one full condition set per pass.

use thermopilot_core::{
    Condition, ConditionSet, ConditionStatus, ConditionType, Decision, format_temperature,
};

use crate::error::ReconcileError;
use crate::types::{ActuationReport, ActuationVerdict};

pub const REASON_RECONCILING: &str = "Reconciling";
pub const REASON_CONTROLLING: &str = "ControllingAirConditioner";
pub const REASON_ADJUSTING: &str = "TemperatureAdjusting";
pub const REASON_STABLE: &str = "TemperatureStable";
pub const REASON_UNKNOWN: &str = "TemperatureUnknown";
pub const REASON_HEALTHY: &str = "Healthy";
pub const REASON_CONTROL_ERROR: &str = "AirConditionerControlError";

/// Builds condition sets for a resource at a given generation.
#[derive(Debug, Clone, Copy)]
pub struct StatusProjector {
    generation: i64,
}

impl StatusProjector {
    #[must_use]
    pub const fn new(generation: i64) -> Self {
        Self { generation }
    }

    /// Conditions for a pass that completed, possibly with partial failures.
    #[must_use]
    pub fn completed(&self, decision: &Decision, actuation: Option<&ActuationReport>) -> ConditionSet {
        let mut conditions = ConditionSet::new();
        conditions.set(self.condition(
            ConditionType::Available,
            ConditionStatus::True,
            REASON_RECONCILING,
            "ThermoPilot is functioning normally",
        ));
        conditions.set(self.settled_progress(decision));

        let degraded = actuation
            .filter(|report| report.verdict() != ActuationVerdict::Succeeded)
            .map_or_else(
                || self.healthy(),
                |report| {
                    self.condition(
                        ConditionType::Degraded,
                        ConditionStatus::True,
                        REASON_CONTROL_ERROR,
                        report.failure_summary(),
                    )
                },
            );
        conditions.set(degraded);
        conditions
    }

    /// Conditions for a pass that ended on `error`.
    ///
    /// `decision` is present when the error happened while acting on it.
    #[must_use]
    pub fn failed(&self, error: &ReconcileError, decision: Option<&Decision>) -> ConditionSet {
        let mut conditions = ConditionSet::new();
        conditions.set(self.condition(
            ConditionType::Available,
            ConditionStatus::False,
            error.reason(),
            error.to_string(),
        ));

        let progressing = match decision {
            Some(decision) if error.is_actuation_stage() => self.condition(
                ConditionType::Progressing,
                ConditionStatus::True,
                REASON_CONTROLLING,
                format!("Performing action: {}", decision.action.label()),
            ),
            Some(decision) => self.settled_progress(decision),
            None => self.condition(
                ConditionType::Progressing,
                ConditionStatus::Unknown,
                REASON_UNKNOWN,
                format!("Temperature was not evaluated: {}", error.reason()),
            ),
        };
        conditions.set(progressing);

        let degraded = if error.is_actuation_stage() {
            self.condition(
                ConditionType::Degraded,
                ConditionStatus::True,
                error.reason(),
                error.to_string(),
            )
        } else {
            self.healthy()
        };
        conditions.set(degraded);
        conditions
    }

    fn settled_progress(&self, decision: &Decision) -> Condition {
        let current = format_temperature(decision.current);
        let target = format_temperature(decision.target);
        if decision.needs_action() {
            self.condition(
                ConditionType::Progressing,
                ConditionStatus::True,
                REASON_ADJUSTING,
                format!("Adjusting temperature: current={current}, target={target}"),
            )
        } else {
            self.condition(
                ConditionType::Progressing,
                ConditionStatus::False,
                REASON_STABLE,
                format!("Temperature is within threshold: current={current}, target={target}"),
            )
        }
    }

    fn healthy(&self) -> Condition {
        self.condition(
            ConditionType::Degraded,
            ConditionStatus::False,
            REASON_HEALTHY,
            "No errors detected",
        )
    }

    fn condition(
        &self,
        condition_type: ConditionType,
        status: ConditionStatus,
        reason: &str,
        message: impl Into<String>,
    ) -> Condition {
        Condition::new(condition_type, status, reason, message, self.generation)
    }
}
