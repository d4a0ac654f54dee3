//! # thermopilot-core
//!
//! Shared kernel for ThermoPilot:
//!
//! - **Resource**: the declared spec and observed status of a ThermoPilot
//! - **Desired state**: typed values resolved from the textual spec
//! - **Decision**: the pure hysteresis engine choosing what to command
//! - **Conditions**: the fixed `Available`/`Progressing`/`Degraded` set
//! - **Ports**: traits for the secret store and the device API
//!
//! # Example
//!
//! ```
//! use thermopilot_core::{Action, Mode, decide};
//!
//! let decision = decide(18.0, 22.0, 1.0, Mode::Cool);
//! assert_eq!(decision.action, Action::AdjustUpTooCold);
//! assert_eq!(decision.adjusted_target, 25.0);
//! ```

#![forbid(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod condition;
pub mod decision;
pub mod desired;
pub mod error;
pub mod ports;
pub mod resource;
pub mod types;

// Re-export main types
pub use condition::{Condition, ConditionSet, ConditionStatus, ConditionType};
pub use decision::{Action, Decision, OVERSHOOT_CORRECTION, decide};
pub use desired::{
    DEFAULT_THRESHOLD, DesiredState, PLAUSIBLE_TARGET_RANGE, PLAUSIBLE_THRESHOLD_MAX, validate_spec,
};
pub use error::{ConfigError, CredentialError, DeviceError};
pub use ports::{CredentialSource, Credentials, DeviceApi, DeviceApiFactory};
pub use resource::{ResourceKey, SecretReference, ThermoPilot, ThermoPilotSpec, ThermoPilotStatus};
pub use types::{ActuatorKind, Mode, SensorDevice, SensorType, format_temperature, parse_temperature};
