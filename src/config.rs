//! `thermopilot.toml` loading.
//!
//! ```toml
//! [switchbot]
//! base_url = "https://api.switch-bot.com/v1.1"
//! timeout_secs = 10
//!
//! [reconciler]
//! steady_requeue_secs = 300
//! command_timeout_secs = 15
//!
//! [[secrets]]
//! name = "switchbot"
//! namespace = "home"
//! data = { token = "...", secret = "..." }
//!
//! [[resources]]
//! name = "living-room"
//! namespace = "home"
//! [resources.spec]
//! secretRef = { name = "switchbot" }
//! temperatureSensorType = "MeterPro"
//! targetTemperature = "25.0"
//! mode = "cool"
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thermopilot_core::{ThermoPilot, ThermoPilotSpec, validate_spec};
use thermopilot_reconciler::{InMemorySecretStore, ReconcilerConfig};
use thermopilot_switchbot::SwitchBotConfig;

const DEFAULT_NAMESPACE: &str = "default";

/// Whole application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub switchbot: SwitchBotConfig,
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
    #[serde(default)]
    pub secrets: Vec<SecretConfig>,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

/// A named secret holding API credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl std::fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretConfig")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("keys", &self.data.keys().sorted().collect_vec())
            .finish()
    }
}

/// A declared ThermoPilot resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub spec: ThermoPilotSpec,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl AppConfig {
    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error on malformed input.
    pub fn parse(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Credential source over the configured secrets.
    pub fn secret_store(&self) -> InMemorySecretStore {
        self.secrets
            .iter()
            .fold(InMemorySecretStore::new(), |store, secret| {
                store.with_secret(&secret.namespace, &secret.name, secret.data.clone())
            })
    }

    /// Resources at generation 1 with empty status.
    pub fn thermopilots(&self) -> Vec<ThermoPilot> {
        self.resources
            .iter()
            .map(|r| ThermoPilot::new(&r.name, &r.namespace, r.spec.clone()))
            .collect()
    }

    /// Every problem found in the file, one line each. Empty when valid.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if let Err(e) = url::Url::parse(&self.switchbot.base_url) {
            problems.push(format!("switchbot.base_url: {e}"));
        }
        if let Err(e) = self.reconciler.validate() {
            problems.push(format!("reconciler: {e}"));
        }

        let mut seen = BTreeSet::new();
        for resource in &self.resources {
            let key = format!("{}/{}", resource.namespace, resource.name);
            if !seen.insert(key.clone()) {
                problems.push(format!("{key}: duplicate resource"));
            }
            if let Err(errors) = validate_spec(&resource.spec) {
                problems.extend(errors.into_iter().map(|e| format!("{key}: {e}")));
            }
            let secret_known = self.secrets.iter().any(|s| {
                s.namespace == resource.namespace && s.name == resource.spec.secret_ref.name
            });
            if !resource.spec.secret_ref.name.is_empty() && !secret_known {
                problems.push(format!(
                    "{key}: secret {} not declared in namespace {}",
                    resource.spec.secret_ref.name, resource.namespace
                ));
            }
        }

        problems
    }
}
