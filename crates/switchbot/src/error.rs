//! Error types for the SwitchBot client.

use thermopilot_core::{CredentialError, DeviceError};
use thiserror::Error;

/// Result type for SwitchBot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the SwitchBot API.
#[derive(Error, Debug)]
pub enum Error {
    /// Non-2xx HTTP response.
    #[error("unexpected status code: {status}, body: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// 2xx HTTP response whose API status code signals failure.
    #[error("unexpected status code: {code}, message: {message}")]
    ApiStatus { code: i64, message: String },

    /// No device matched the lookup.
    #[error("{what} not found")]
    NotFound { what: String },

    /// A successful status response without a temperature.
    #[error("status of {device_id} has no temperature reading")]
    MissingReading { device_id: String },

    /// Configuration error.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The secret could not key the request signature.
    ///
    /// HMAC-SHA256 accepts keys of any length, so this is not expected in
    /// practice; it exists because the keyed constructor is fallible.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    /// HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a missing reading error.
    pub fn missing_reading(device_id: impl Into<String>) -> Self {
        Self::MissingReading {
            device_id: device_id.into(),
        }
    }

    /// Create a config error.
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create an invalid credentials error.
    pub fn invalid_credentials(reason: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            reason: reason.into(),
        }
    }
}

impl From<Error> for DeviceError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { what } => Self::NotFound { what },
            Error::UnexpectedStatus { status, body } => Self::rejected(status, body),
            Error::ApiStatus { code, message } => {
                Self::rejected(u16::try_from(code).unwrap_or(u16::MAX), message)
            }
            Error::Json(e) => Self::decode(e.to_string()),
            e @ Error::MissingReading { .. } => Self::decode(e.to_string()),
            Error::Http(e) if e.is_decode() => Self::decode(e.to_string()),
            other => Self::request(other.to_string()),
        }
    }
}

impl From<Error> for CredentialError {
    fn from(err: Error) -> Self {
        Self::client_setup(err.to_string())
    }
}
