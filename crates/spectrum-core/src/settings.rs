//! Persisted user settings.

use crate::error::Result;
use crate::store::{keys, KeyValueStore};
use std::sync::Arc;
use tracing::warn;

pub struct Settings {
    store: Arc<dyn KeyValueStore>,
    synthesis_enabled: bool,
}

impl Settings {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let synthesis_enabled = match store.get(keys::ENABLE_SUMMARY)?.as_deref() {
            Some("true") => true,
            Some("false") | None => false,
            Some(other) => {
                warn!("Ignoring invalid {} value: {}", keys::ENABLE_SUMMARY, other);
                false
            }
        };
        Ok(Self {
            store,
            synthesis_enabled,
        })
    }

    /// Whether rounds request an inline synthesis.
    pub fn synthesis_enabled(&self) -> bool {
        self.synthesis_enabled
    }

    pub fn set_synthesis_enabled(&mut self, enabled: bool) -> Result<()> {
        let value = if enabled { "true" } else { "false" };
        self.store.set(keys::ENABLE_SUMMARY, value)?;
        self.synthesis_enabled = enabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_synthesis_flag_persists() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut settings = Settings::load(kv.clone()).unwrap();
        assert!(!settings.synthesis_enabled());

        settings.set_synthesis_enabled(true).unwrap();
        assert_eq!(kv.get("enable-summary").unwrap(), Some("true".into()));
        assert!(Settings::load(kv.clone()).unwrap().synthesis_enabled());

        kv.set("enable-summary", "yes please").unwrap();
        assert!(!Settings::load(kv).unwrap().synthesis_enabled());
    }
}
