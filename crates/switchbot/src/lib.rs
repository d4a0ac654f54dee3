#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # thermopilot-switchbot
//!
//! SwitchBot v1.1 cloud API client for ThermoPilot.
//!
//! ## Features
//!
//! - HMAC-SHA256 request signing (`Authorization`, `sign`, `nonce`, `t` headers)
//! - Device listing, Meter Pro lookup and air conditioner discovery
//! - Meter temperature reads and `setAll` air conditioner commands
//! - [`SwitchBotConnector`], the device API factory the reconciler uses
//!
//! The API base URL lives in [`SwitchBotConfig`] and is fixed when a client
//! is built, so tests point a client at a mock server without global state.
//!
//! ## Example
//!
//! ```ignore
//! use thermopilot_core::Credentials;
//! use thermopilot_switchbot::{SwitchBotClient, SwitchBotConfig};
//!
//! let client = SwitchBotClient::new(SwitchBotConfig::default(), Credentials::new(token, secret))?;
//! let meter = client.meter_pro().await?;
//! let celsius = client.temperature(&meter.device_id).await?;
//! ```

pub mod adapter;
pub mod client;
pub mod config;
pub mod error;
pub mod sign;
pub mod types;

// Re-export commonly used items
pub use adapter::SwitchBotConnector;
pub use client::{AIR_CONDITIONER, METER_PRO, SwitchBotClient};
pub use config::{DEFAULT_BASE_URL, SwitchBotConfig};
pub use error::{Error, Result};
pub use types::AirConditionerMode;
