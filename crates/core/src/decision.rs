//! Decision engine.
//!
//! Pure mapping from (current, target, threshold, mode) to an [`Action`].
//! Within `±threshold` of the target nothing happens. Outside it, the room is
//! either moving the way the mode wants (command the target as-is) or the
//! wrong way, in which case the command is pushed [`OVERSHOOT_CORRECTION`]
//! degrees away from the target to ease off the device.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::types::Mode;

/// Offset applied to the commanded target when the room drifts against the mode.
pub const OVERSHOOT_CORRECTION: f64 = 3.0;

/// What a pass should do about the current reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    None,
    Cool,
    AdjustUpTooCold,
    Heat,
    AdjustDownTooWarm,
}

impl Action {
    /// Human-readable label used in logs and condition messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Cool => "cooling",
            Self::AdjustUpTooCold => "adjusting up (too cold)",
            Self::Heat => "heating",
            Self::AdjustDownTooWarm => "adjusting down (too warm)",
        }
    }

    /// Delta added to the declared target before it is commanded.
    #[must_use]
    pub const fn target_offset(self) -> f64 {
        match self {
            Self::AdjustUpTooCold => OVERSHOOT_CORRECTION,
            Self::AdjustDownTooWarm => -OVERSHOOT_CORRECTION,
            Self::None | Self::Cool | Self::Heat => 0.0,
        }
    }

    #[must_use]
    pub const fn needs_action(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Outcome of the decision engine for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub action: Action,
    pub device_mode: Mode,
    pub adjusted_target: f64,
    pub current: f64,
    pub target: f64,
    pub difference: f64,
}

impl Decision {
    #[must_use]
    pub const fn needs_action(&self) -> bool {
        self.action.needs_action()
    }
}

/// Decide what to do about the current reading.
///
/// `threshold` is expected to be non-negative; the desired-state resolver
/// guarantees it.
#[must_use]
pub fn decide(current: f64, target: f64, threshold: f64, mode: Mode) -> Decision {
    let difference = current - target;
    let too_warm = difference > threshold;
    let too_cold = difference < -threshold;

    let action = match mode {
        Mode::Cool if too_warm => Action::Cool,
        Mode::Cool if too_cold => Action::AdjustUpTooCold,
        Mode::Heat if too_cold => Action::Heat,
        Mode::Heat if too_warm => Action::AdjustDownTooWarm,
        Mode::Cool | Mode::Heat => Action::None,
    };

    Decision {
        action,
        device_mode: mode,
        adjusted_target: target + action.target_offset(),
        current,
        target,
        difference,
    }
}
