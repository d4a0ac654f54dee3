//! The ThermoPilot resource document: declared spec plus observed status.

use serde::{Deserialize, Serialize};

use crate::condition::ConditionSet;

/// Default key holding the API token inside the referenced secret.
pub const DEFAULT_TOKEN_KEY: &str = "token";
/// Default key holding the signing secret inside the referenced secret.
pub const DEFAULT_SECRET_KEY: &str = "secret";

/// Location of the device API credentials.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    /// Name of the secret in the resource's namespace.
    pub name: String,
    /// Key of the token entry; `token` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
    /// Key of the signing secret entry; `secret` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

impl SecretReference {
    /// Create a reference using the default keys.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Effective token key.
    #[must_use]
    pub fn token_key(&self) -> &str {
        non_empty(self.token_key.as_deref()).unwrap_or(DEFAULT_TOKEN_KEY)
    }

    /// Effective signing secret key.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        non_empty(self.secret_key.as_deref()).unwrap_or(DEFAULT_SECRET_KEY)
    }
}

/// Declared desired state, as written by the user.
///
/// Fields stay textual here; [`crate::desired::DesiredState::resolve`] turns
/// them into typed values every pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermoPilotSpec {
    pub secret_ref: SecretReference,
    /// Single air conditioner to command; all discovered ones when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_conditioner_id: Option<String>,
    pub temperature_sensor_type: String,
    pub target_temperature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<String>,
    pub mode: String,
}

impl ThermoPilotSpec {
    /// Explicitly configured actuator, ignoring empty strings.
    #[must_use]
    pub fn explicit_actuator(&self) -> Option<&str> {
        non_empty(self.air_conditioner_id.as_deref())
    }
}

/// Observed state written back after every pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermoPilotStatus {
    #[serde(default)]
    pub conditions: ConditionSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_temperature: Option<String>,
}

/// A ThermoPilot resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermoPilot {
    pub name: String,
    pub namespace: String,
    /// Bumped by the store whenever `spec` changes.
    #[serde(default)]
    pub generation: i64,
    pub spec: ThermoPilotSpec,
    #[serde(default)]
    pub status: ThermoPilotStatus,
}

impl ThermoPilot {
    /// Create a resource at generation 1 with an empty status.
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        spec: ThermoPilotSpec,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            generation: 1,
            spec,
            status: ThermoPilotStatus::default(),
        }
    }

    /// `namespace/name` key.
    #[must_use]
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.namespace, &self.name)
    }
}

/// Namespaced name identifying a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    /// Create a new key.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
