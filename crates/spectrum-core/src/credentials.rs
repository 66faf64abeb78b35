//! Credential store: provider → API key and selected sub-model.
//!
//! The store performs no validation and has no network dependency. Keys must
//! be validated against the aggregation service before [`CredentialStore::set`]
//! is called; the orchestrator does that in `register_credential`.

use crate::error::{Error, Result};
use crate::store::{keys, KeyValueStore};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A stored provider credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub provider: String,
    pub secret: String,
    pub sub_model: Option<String>,
}

impl Credential {
    /// Masked key for display: first and last three characters.
    pub fn masked(&self) -> String {
        mask_secret(&self.secret)
    }
}

// Keep secrets out of debug output and logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider)
            .field("secret", &self.masked())
            .field("sub_model", &self.sub_model)
            .finish()
    }
}

/// Mask a secret as `abc•••xyz`.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 6 {
        return "•".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{}{}{}", head, "•".repeat(chars.len() - 6), tail)
}

/// Write-through credential store.
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    entries: BTreeMap<String, Credential>,
}

impl CredentialStore {
    /// Load every stored credential.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for key in store.keys()? {
            let Some(provider) = key.strip_suffix(keys::CREDENTIAL_SUFFIX) else {
                continue;
            };
            if provider.is_empty() {
                continue;
            }
            let Some(secret) = store.get(&key)? else {
                continue;
            };
            let sub_model = store.get(&keys::sub_model(provider))?;
            entries.insert(
                provider.to_string(),
                Credential {
                    provider: provider.to_string(),
                    secret,
                    sub_model,
                },
            );
        }
        Ok(Self { store, entries })
    }

    /// Store (or replace) the key for a provider. Any sub-model selection is kept.
    pub fn set(&mut self, provider: &str, secret: &str) -> Result<()> {
        self.store.set(&keys::credential(provider), secret)?;
        let sub_model = self.entries.get(provider).and_then(|c| c.sub_model.clone());
        self.entries.insert(
            provider.to_string(),
            Credential {
                provider: provider.to_string(),
                secret: secret.to_string(),
                sub_model,
            },
        );
        Ok(())
    }

    pub fn get(&self, provider: &str) -> Option<&Credential> {
        self.entries.get(provider)
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.entries.contains_key(provider)
    }

    /// Remove a provider's key and sub-model selection. Idempotent.
    ///
    /// Returns whether a credential existed.
    pub fn delete(&mut self, provider: &str) -> Result<bool> {
        self.store.delete(&keys::credential(provider))?;
        self.store.delete(&keys::sub_model(provider))?;
        Ok(self.entries.remove(provider).is_some())
    }

    /// Select the sub-model used for a provider.
    pub fn set_sub_model(&mut self, provider: &str, sub_model: &str) -> Result<()> {
        let Some(entry) = self.entries.get_mut(provider) else {
            return Err(Error::NoCredential(provider.to_string()));
        };
        self.store.set(&keys::sub_model(provider), sub_model)?;
        entry.sub_model = Some(sub_model.to_string());
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
