//! Scripted aggregation service for orchestrator tests.

use super::{Orchestrator, OrchestratorConfig};
use crate::error::{Error, Result};
use crate::service::AggregationService;
use crate::store::{KeyValueStore, MemoryStore};
use crate::types::*;
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
pub struct FakeService {
    query_replies: Mutex<VecDeque<Result<QueryReply>>>,
    validations: Mutex<VecDeque<ValidateKeyReply>>,
    summaries: Mutex<VecDeque<Result<SummarizeReply>>>,
    exports: Mutex<VecDeque<Result<ExportReply>>>,
    sent_queries: Mutex<Vec<QueryRequest>>,
    sent_summaries: Mutex<Vec<SummarizeRequest>>,
    sent_exports: Mutex<Vec<ExportRequest>>,
    summary_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeService {
    pub fn push_query(&self, reply: Result<QueryReply>) {
        self.query_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_validation(&self, valid: bool, message: &str) {
        self.validations.lock().unwrap().push_back(ValidateKeyReply {
            valid,
            message: message.to_string(),
        });
    }

    pub fn push_summary(&self, reply: Result<SummarizeReply>) {
        self.summaries.lock().unwrap().push_back(reply);
    }

    pub fn push_export(&self, reply: Result<ExportReply>) {
        self.exports.lock().unwrap().push_back(reply);
    }

    /// Hold `/summarize` replies until the returned handle is notified.
    pub fn gate_summaries(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.summary_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn queries(&self) -> Vec<QueryRequest> {
        self.sent_queries.lock().unwrap().clone()
    }

    pub fn summaries(&self) -> Vec<SummarizeRequest> {
        self.sent_summaries.lock().unwrap().clone()
    }

    pub fn exports(&self) -> Vec<ExportRequest> {
        self.sent_exports.lock().unwrap().clone()
    }
}

fn unscripted(route: &str) -> Error {
    Error::Transport(format!("no scripted reply for {route}"))
}

#[async_trait]
impl AggregationService for FakeService {
    async fn list_models(&self) -> Result<ProviderCatalog> {
        Ok(test_catalog())
    }

    async fn validate_key(&self, _request: &ValidateKeyRequest) -> Result<ValidateKeyReply> {
        self.validations
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| unscripted("/validate-key"))
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryReply> {
        self.sent_queries.lock().unwrap().push(request.clone());
        self.query_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("/query")))
    }

    async fn summarize(&self, request: &SummarizeRequest) -> Result<SummarizeReply> {
        self.sent_summaries.lock().unwrap().push(request.clone());
        let gate = self.summary_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.summaries
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("/summarize")))
    }

    async fn export(&self, request: &ExportRequest) -> Result<ExportReply> {
        self.sent_exports.lock().unwrap().push(request.clone());
        self.exports
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("/export")))
    }
}

/// Memory store that can be told to fail writes to one key.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<Option<String>>,
}

impl FlakyStore {
    pub fn fail_writes_to(&self, key: &str) {
        *self.failing.lock().unwrap() = Some(key.to_string());
    }

    fn check(&self, key: &str) -> Result<()> {
        match self.failing.lock().unwrap().as_deref() {
            Some(failing) if failing == key => Err(Error::Io(std::io::Error::other("disk full"))),
            _ => Ok(()),
        }
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check(key)?;
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.check(key)?;
        self.inner.delete(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }
}

pub fn test_catalog() -> ProviderCatalog {
    let body = r#"{
        "openai": {"name": "OpenAI", "models": [
            {"id": "gpt-4o", "name": "GPT-4o"},
            {"id": "gpt-3.5-turbo", "name": "GPT-3.5 Turbo"}
        ]},
        "anthropic": {"name": "Anthropic", "models": [
            {"id": "claude-3-opus-20240229", "name": "Claude 3 Opus"},
            {"id": "claude-3-haiku-20240307", "name": "Claude 3 Haiku"}
        ]},
        "mistral": {"name": "Mistral AI", "models": [
            {"id": "mistral-large-latest", "name": "Mistral Large"}
        ]},
        "local": {"name": "Local Models", "models": []}
    }"#;
    let map: BTreeMap<String, ProviderDescriptor> = serde_json::from_str(body).unwrap();
    ProviderCatalog::from_map(map)
}

pub fn query_reply(body: &str) -> QueryReply {
    serde_json::from_str(body).unwrap()
}

/// Orchestrator whose store already holds the given credentials, all active
/// in the given order.
pub fn orchestrator_with(
    credentials: &[(&str, &str)],
) -> (Orchestrator, Arc<FakeService>, Arc<dyn KeyValueStore>) {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    for (provider, secret) in credentials {
        kv.set(&format!("{provider}-key"), secret).unwrap();
    }
    let active: Vec<&str> = credentials.iter().map(|(p, _)| *p).collect();
    kv.set("active-models", &serde_json::to_string(&active).unwrap())
        .unwrap();

    let service = Arc::new(FakeService::default());
    let orch = Orchestrator::new(
        service.clone(),
        kv.clone(),
        test_catalog(),
        OrchestratorConfig::default(),
    )
    .unwrap();
    (orch, service, kv)
}
