//! Active provider set: the providers included in the next round.
//!
//! Membership is ordered by activation time and that order is the iteration
//! order used for dispatch, display and synthesis-driver selection. Every
//! member must hold a credential.

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::store::{keys, load_json, save_json, KeyValueStore};
use std::sync::Arc;
use tracing::warn;

pub struct ActiveProviderSet {
    store: Arc<dyn KeyValueStore>,
    members: Vec<String>,
}

impl ActiveProviderSet {
    /// Load the persisted set, dropping members that no longer hold a credential.
    pub fn load(store: Arc<dyn KeyValueStore>, credentials: &CredentialStore) -> Result<Self> {
        let stored: Vec<String> = load_json(store.as_ref(), keys::ACTIVE_PROVIDERS)?.unwrap_or_default();

        let mut members: Vec<String> = Vec::with_capacity(stored.len());
        for provider in &stored {
            if !credentials.contains(provider) {
                warn!("Dropping active provider {} without a stored key", provider);
                continue;
            }
            if !members.contains(provider) {
                members.push(provider.clone());
            }
        }

        let set = Self { store, members };
        if set.members != stored {
            set.save()?;
        }
        Ok(set)
    }

    /// Add a provider. Fails with [`Error::NoCredential`] when it has no key.
    ///
    /// Returns whether the provider was newly added.
    pub fn activate(&mut self, provider: &str, credentials: &CredentialStore) -> Result<bool> {
        if !credentials.contains(provider) {
            return Err(Error::NoCredential(provider.to_string()));
        }
        if self.contains(provider) {
            return Ok(false);
        }
        self.members.push(provider.to_string());
        if let Err(e) = self.save() {
            self.members.pop();
            return Err(e);
        }
        Ok(true)
    }

    /// Remove a provider. Returns whether it was a member.
    pub fn deactivate(&mut self, provider: &str) -> Result<bool> {
        let Some(index) = self.members.iter().position(|p| p == provider) else {
            return Ok(false);
        };
        let removed = self.members.remove(index);
        if let Err(e) = self.save() {
            self.members.insert(index, removed);
            return Err(e);
        }
        Ok(true)
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.members.iter().any(|p| p == provider)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.members.clone()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn save(&self) -> Result<()> {
        save_json(self.store.as_ref(), keys::ACTIVE_PROVIDERS, &self.members)
    }
}
