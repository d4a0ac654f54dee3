//! Status conditions.
//!
//! A resource carries exactly one condition per [`ConditionType`]. Each pass
//! writes all of them, so nothing from an earlier pass survives a spec change.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named aspects of reconciliation health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    Available,
    Progressing,
    Degraded,
}

impl ConditionType {
    /// All condition types, in display order.
    pub const ALL: [Self; 3] = [Self::Available, Self::Progressing, Self::Degraded];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Progressing => "Progressing",
            Self::Degraded => "Degraded",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state condition status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::True => "True",
            Self::False => "False",
            Self::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// A single status condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub status: ConditionStatus,
    pub reason: String,
    pub message: String,
    pub observed_generation: i64,
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a condition stamped with the current time.
    pub fn new(
        condition_type: ConditionType,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
        observed_generation: i64,
    ) -> Self {
        Self {
            condition_type,
            status,
            reason: reason.into(),
            message: message.into(),
            observed_generation,
            last_transition_time: Utc::now(),
        }
    }

    /// True when everything but the transition time matches.
    #[must_use]
    pub fn same_state(&self, other: &Self) -> bool {
        self.condition_type == other.condition_type
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
            && self.observed_generation == other.observed_generation
    }
}

/// Fixed set of conditions keyed by type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progressing: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Condition>,
}

impl ConditionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the condition of a type.
    #[must_use]
    pub const fn get(&self, condition_type: ConditionType) -> Option<&Condition> {
        match condition_type {
            ConditionType::Available => self.available.as_ref(),
            ConditionType::Progressing => self.progressing.as_ref(),
            ConditionType::Degraded => self.degraded.as_ref(),
        }
    }

    /// Overwrite the condition slot matching the condition's type.
    pub fn set(&mut self, condition: Condition) {
        let slot = match condition.condition_type {
            ConditionType::Available => &mut self.available,
            ConditionType::Progressing => &mut self.progressing,
            ConditionType::Degraded => &mut self.degraded,
        };
        *slot = Some(condition);
    }

    /// Status of a condition type, `Unknown` when unset.
    #[must_use]
    pub fn status(&self, condition_type: ConditionType) -> ConditionStatus {
        self.get(condition_type)
            .map_or(ConditionStatus::Unknown, |c| c.status)
    }

    /// Iterate over the set conditions in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        ConditionType::ALL.into_iter().filter_map(|t| self.get(t))
    }

    /// Keep the previous transition time for every condition whose status
    /// did not change.
    #[must_use]
    pub fn carry_transitions(mut self, previous: &Self) -> Self {
        for condition_type in ConditionType::ALL {
            let prior = previous.get(condition_type);
            let slot = match condition_type {
                ConditionType::Available => &mut self.available,
                ConditionType::Progressing => &mut self.progressing,
                ConditionType::Degraded => &mut self.degraded,
            };
            if let (Some(current), Some(prior)) = (slot.as_mut(), prior) {
                if current.status == prior.status {
                    current.last_transition_time = prior.last_transition_time;
                }
            }
        }
        self
    }

    /// True when both sets hold the same conditions, ignoring timestamps.
    #[must_use]
    pub fn same_state(&self, other: &Self) -> bool {
        ConditionType::ALL
            .into_iter()
            .all(|t| match (self.get(t), other.get(t)) {
                (Some(a), Some(b)) => a.same_state(b),
                (None, None) => true,
                _ => false,
            })
    }
}
