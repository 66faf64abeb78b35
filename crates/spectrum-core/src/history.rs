//! Bounded query history, most recent first.

use crate::error::Result;
use crate::store::{keys, load_json, save_json, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximum number of remembered top-level queries.
pub const HISTORY_CAPACITY: usize = 10;

/// A submitted top-level query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query: String,
    pub timestamp: DateTime<Utc>,
}

pub struct QueryHistory {
    store: Arc<dyn KeyValueStore>,
    records: Vec<QueryRecord>,
}

impl QueryHistory {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let mut records: Vec<QueryRecord> =
            load_json(store.as_ref(), keys::QUERY_HISTORY)?.unwrap_or_default();
        records.truncate(HISTORY_CAPACITY);
        Ok(Self { store, records })
    }

    /// Prepend a record, evicting the oldest beyond capacity.
    pub fn record(&mut self, query: &str, timestamp: DateTime<Utc>) -> Result<()> {
        self.records.insert(
            0,
            QueryRecord {
                query: query.to_string(),
                timestamp,
            },
        );
        self.records.truncate(HISTORY_CAPACITY);
        save_json(self.store.as_ref(), keys::QUERY_HISTORY, &self.records)
    }

    pub fn records(&self) -> &[QueryRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&QueryRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
