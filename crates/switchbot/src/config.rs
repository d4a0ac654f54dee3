//! Configuration for the SwitchBot client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Public SwitchBot API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.switch-bot.com/v1.1";

/// Configuration for the SwitchBot client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchBotConfig {
    /// API base URL, including the version path.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for a single request.
    #[serde(
        rename = "timeout_secs",
        with = "duration_secs",
        default = "default_timeout"
    )]
    pub timeout: Duration,
}

impl Default for SwitchBotConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

impl SwitchBotConfig {
    /// Create a config pointing at a different API endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Apply `SWITCHBOT_API_URL` and `SWITCHBOT_TIMEOUT_SECS` overrides.
    ///
    /// # Errors
    ///
    /// Returns a config error when a variable is set but malformed.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("SWITCHBOT_API_URL") {
            url::Url::parse(&url)
                .map_err(|e| Error::config_error(format!("SWITCHBOT_API_URL: {e}")))?;
            self.base_url = url;
        }

        if let Ok(secs) = std::env::var("SWITCHBOT_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::config_error(format!("SWITCHBOT_TIMEOUT_SECS: {e}")))?;
            self.timeout = Duration::from_secs(secs);
        }

        Ok(self)
    }

    /// Full URL for an API path such as `/devices`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Serialization helper for Duration as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
