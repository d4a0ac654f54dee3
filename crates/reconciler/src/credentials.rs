//! In-process credential source backed by named secrets.

use std::collections::HashMap;

use async_trait::async_trait;
use thermopilot_core::{CredentialError, CredentialSource, Credentials, SecretReference};
use tracing::debug;

type SecretData = HashMap<String, String>;

/// Secrets keyed by `(namespace, name)`, each a map of key to value.
#[derive(Default, Clone)]
pub struct InMemorySecretStore {
    secrets: HashMap<(String, String), SecretData>,
}

impl InMemorySecretStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a secret.
    #[must_use]
    pub fn with_secret(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: SecretData,
    ) -> Self {
        self.secrets.insert((namespace.into(), name.into()), data);
        self
    }

    /// Number of secrets held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

// Values are never printed.
impl std::fmt::Debug for InMemorySecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySecretStore")
            .field("secrets", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn lookup(
    data: &SecretData,
    kind: &'static str,
    key: &str,
    name: &str,
) -> Result<String, CredentialError> {
    let value = data.get(key).ok_or_else(|| CredentialError::KeyMissing {
        kind,
        key: key.to_string(),
        name: name.to_string(),
    })?;
    if value.is_empty() {
        return Err(CredentialError::EmptyValue {
            kind,
            name: name.to_string(),
        });
    }
    Ok(value.clone())
}

#[async_trait]
impl CredentialSource for InMemorySecretStore {
    async fn resolve(
        &self,
        secret_ref: &SecretReference,
        namespace: &str,
    ) -> Result<Credentials, CredentialError> {
        let name = secret_ref.name.as_str();
        let data = self
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| {
                CredentialError::secret_unavailable(
                    name,
                    format!("secret {namespace}/{name} not found"),
                )
            })?;

        let token = lookup(data, "token", secret_ref.token_key(), name)?;
        let secret = lookup(data, "secret", secret_ref.secret_key(), name)?;
        debug!(namespace, secret = name, "Resolved credentials");

        Ok(Credentials::new(token, secret))
    }
}
