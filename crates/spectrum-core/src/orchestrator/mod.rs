//! Query orchestration and response lifecycle.
//!
//! The [`Orchestrator`] owns every piece of client state behind one lock:
//! credentials, the active provider set, history, settings, and the
//! [`ResponseAggregate`] describing what is displayed. The lock is never held
//! across an aggregation-service call.
//!
//! ## Round lifecycle
//!
//! ```text
//!            begin_round                 reply / transport error
//!   Idle ───────────────► Dispatching ─────────────────────────► Settling ──► Complete
//!     ▲         │                │                                               │
//!     │   guard rejected         │ newer round began                             │
//!     │   (no mutation)          └──────────► Stale (reply discarded)            │
//!     └──────────────────────────────────────────────────────────────────────────┘
//!                                 next round
//! ```
//!
//! Every round gets a sequence number. Only the reply carrying the latest
//! sequence number may touch the slots, so rounds may overlap freely.
//!
//! Callers that need to interleave rounds (or drive the service themselves)
//! can use [`Orchestrator::begin_round`] and [`Orchestrator::settle_round`]
//! directly; [`Orchestrator::submit`] and friends combine both around the
//! service call.

mod export;
mod insight;
mod round;

#[cfg(test)]
mod testing;

pub use export::*;
pub use insight::*;
pub use round::*;

use crate::aggregate::{PlannedSlot, ResponseAggregate, RoundContext, RoundKind};
use crate::credentials::{Credential, CredentialStore};
use crate::error::{Error, Result};
use crate::history::{QueryHistory, QueryRecord};
use crate::selection::ActiveProviderSet;
use crate::service::AggregationService;
use crate::settings::Settings;
use crate::store::KeyValueStore;
use crate::types::{ProviderCatalog, ProviderKey, QueryReply, QueryRequest, ValidateKeyRequest};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Provider used to drive on-demand synthesis when it holds a credential.
pub const DEFAULT_SYNTHESIS_PROVIDER: &str = "openai";

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Preferred driver for insights requests.
    pub canonical_synthesis_provider: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            canonical_synthesis_provider: DEFAULT_SYNTHESIS_PROVIDER.to_string(),
        }
    }
}

struct State {
    catalog: ProviderCatalog,
    credentials: CredentialStore,
    active: ActiveProviderSet,
    history: QueryHistory,
    settings: Settings,
    aggregate: ResponseAggregate,
    phase: RoundPhase,
    latest_seq: u64,
    /// Session-only synthesis choice, taking precedence over the persisted setting.
    synthesis_override: Option<bool>,
}

impl State {
    /// Sub-model used for a provider: the stored selection, else the catalog default.
    fn resolve_sub_model(&self, provider: &str) -> Option<String> {
        let credential = self.credentials.get(provider)?;
        credential.sub_model.clone().or_else(|| {
            self.catalog
                .get(provider)
                .and_then(|d| d.default_sub_model())
                .map(str::to_string)
        })
    }

    /// Key and sub-model for a provider that can be dispatched.
    fn provider_key(&self, provider: &str) -> Option<ProviderKey> {
        let credential = self.credentials.get(provider)?;
        let model = self.resolve_sub_model(provider)?;
        Some(ProviderKey {
            key: credential.secret.clone(),
            model,
        })
    }
}

pub struct Orchestrator {
    service: Arc<dyn AggregationService>,
    state: Mutex<State>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Load persisted state and build an orchestrator over a known catalog.
    pub fn new(
        service: Arc<dyn AggregationService>,
        store: Arc<dyn KeyValueStore>,
        catalog: ProviderCatalog,
        config: OrchestratorConfig,
    ) -> Result<Self> {
        let credentials = CredentialStore::load(store.clone())?;
        let active = ActiveProviderSet::load(store.clone(), &credentials)?;
        let history = QueryHistory::load(store.clone())?;
        let settings = Settings::load(store)?;

        let mut aggregate = ResponseAggregate::new();
        for provider in active.iter() {
            aggregate.placeholder(provider);
        }

        debug!(
            "Loaded state: {} credentials, {} active providers, {} history entries",
            credentials.len(),
            active.len(),
            history.len()
        );

        Ok(Self {
            service,
            state: Mutex::new(State {
                catalog,
                credentials,
                active,
                history,
                settings,
                aggregate,
                phase: RoundPhase::Idle,
                latest_seq: 0,
                synthesis_override: None,
            }),
            config,
        })
    }

    /// Fetch the provider catalog from the service, then load persisted state.
    pub async fn connect(
        service: Arc<dyn AggregationService>,
        store: Arc<dyn KeyValueStore>,
        config: OrchestratorConfig,
    ) -> Result<Self> {
        let catalog = service.list_models().await?;
        info!("Provider catalog loaded: {} providers", catalog.len());
        Self::new(service, store, catalog, config)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| Error::LockPoisoned)
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Snapshots
    // ─────────────────────────────────────────────────────────────────────────

    pub fn catalog(&self) -> Result<ProviderCatalog> {
        Ok(self.lock()?.catalog.clone())
    }

    /// Active providers in activation order.
    pub fn active_providers(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.active.to_vec())
    }

    pub fn credentials(&self) -> Result<Vec<Credential>> {
        Ok(self.lock()?.credentials.iter().cloned().collect())
    }

    pub fn credential(&self, provider: &str) -> Result<Option<Credential>> {
        Ok(self.lock()?.credentials.get(provider).cloned())
    }

    /// Sub-model a provider would be dispatched with.
    pub fn resolved_sub_model(&self, provider: &str) -> Result<Option<String>> {
        Ok(self.lock()?.resolve_sub_model(provider))
    }

    pub fn history(&self) -> Result<Vec<QueryRecord>> {
        Ok(self.lock()?.history.records().to_vec())
    }

    pub fn aggregate(&self) -> Result<ResponseAggregate> {
        Ok(self.lock()?.aggregate.clone())
    }

    pub fn phase(&self) -> Result<RoundPhase> {
        Ok(self.lock()?.phase)
    }

    pub fn synthesis_enabled(&self) -> Result<bool> {
        Ok(self.lock()?.settings.synthesis_enabled())
    }

    pub fn set_synthesis_enabled(&self, enabled: bool) -> Result<()> {
        self.lock()?.settings.set_synthesis_enabled(enabled)
    }

    /// Request or suppress inline synthesis for this session only. `None`
    /// falls back to the persisted setting.
    pub fn override_synthesis(&self, enabled: Option<bool>) -> Result<()> {
        self.lock()?.synthesis_override = enabled;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Credentials & Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate a key with the service, store it and activate the provider.
    pub async fn register_credential(&self, provider: &str, secret: &str) -> Result<()> {
        let secret = secret.trim();
        {
            let state = self.lock()?;
            if !state.catalog.contains(provider) {
                return Err(Error::UnknownProvider(provider.to_string()));
            }
        }
        if secret.is_empty() {
            return Err(Error::KeyRejected("API key is empty".to_string()));
        }

        let request = ValidateKeyRequest {
            provider: provider.to_string(),
            api_key: secret.to_string(),
        };
        let reply = self.service.validate_key(&request).await?;
        if !reply.valid {
            return Err(Error::KeyRejected(reply.message));
        }

        let mut state = self.lock()?;
        let state = &mut *state;
        state.credentials.set(provider, secret)?;
        state.active.activate(provider, &state.credentials)?;
        state.aggregate.placeholder(provider);
        info!("Stored API key for {}", provider);
        Ok(())
    }

    /// Delete a provider's key, evicting it from the active set and the display.
    pub fn remove_credential(&self, provider: &str) -> Result<bool> {
        let mut state = self.lock()?;
        // Deactivate first so a failed write never leaves an active provider without a key
        state.active.deactivate(provider)?;
        state.aggregate.remove(provider);
        let existed = state.credentials.delete(provider)?;
        if existed {
            info!("Removed API key for {}", provider);
        }
        Ok(existed)
    }

    pub fn select_sub_model(&self, provider: &str, model: &str) -> Result<()> {
        let mut state = self.lock()?;
        let descriptor = state
            .catalog
            .get(provider)
            .ok_or_else(|| Error::UnknownProvider(provider.to_string()))?;
        if !descriptor.has_sub_model(model) {
            return Err(Error::UnknownSubModel {
                provider: provider.to_string(),
                model: model.to_string(),
            });
        }
        state.credentials.set_sub_model(provider, model)?;
        debug!("Selected {} for {}", model, provider);
        Ok(())
    }

    /// Include a provider in future rounds. Returns whether it was newly added.
    pub fn activate(&self, provider: &str) -> Result<bool> {
        let mut state = self.lock()?;
        let state = &mut *state;
        let added = state.active.activate(provider, &state.credentials)?;
        state.aggregate.placeholder(provider);
        Ok(added)
    }

    /// Exclude a provider from future rounds and drop its slot.
    pub fn deactivate(&self, provider: &str) -> Result<bool> {
        let mut state = self.lock()?;
        let removed = state.active.deactivate(provider)?;
        state.aggregate.remove(provider);
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rounds
    // ─────────────────────────────────────────────────────────────────────────

    /// Submit a top-level query.
    pub async fn submit(&self, query: &str) -> Result<RoundOutcome> {
        self.run_round(query, RoundKind::TopLevel).await
    }

    /// Submit a follow-up query. Follow-ups are not recorded in history.
    pub async fn follow_up(&self, query: &str) -> Result<RoundOutcome> {
        self.run_round(query, RoundKind::FollowUp).await
    }

    /// Resubmit the query behind the displayed slots.
    pub async fn retry(&self) -> Result<RoundOutcome> {
        let query = {
            let state = self.lock()?;
            state
                .aggregate
                .context()
                .map(|c| c.query.clone())
                .ok_or(Error::NothingToRetry)?
        };
        self.run_round(&query, RoundKind::Retry).await
    }

    async fn run_round(&self, query: &str, kind: RoundKind) -> Result<RoundOutcome> {
        let ticket = self.begin_round(query, kind)?;
        let result = self.service.query(&ticket.request).await;
        self.settle_round(&ticket, result)
    }

    /// Guard and dispatch: allocate a sequence number and pending slots.
    ///
    /// Guard rejections leave every piece of state untouched.
    pub fn begin_round(&self, query: &str, kind: RoundKind) -> Result<RoundTicket> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let mut state = self.lock()?;

        let mut plan = Vec::with_capacity(state.active.len());
        let mut api_keys = BTreeMap::new();
        for provider in state.active.iter() {
            let key = state.provider_key(provider);
            if key.is_none() {
                debug!("Skipping {}: no sub-model available", provider);
            }
            plan.push(PlannedSlot {
                provider: provider.to_string(),
                model: key.as_ref().map(|k| k.model.clone()),
            });
            if let Some(key) = key {
                api_keys.insert(provider.to_string(), key);
            }
        }
        if api_keys.is_empty() {
            return Err(Error::NoEligibleProvider);
        }

        let summarize = state
            .synthesis_override
            .unwrap_or_else(|| state.settings.synthesis_enabled());
        state.latest_seq += 1;
        let seq = state.latest_seq;
        state.aggregate.begin(&plan, summarize);
        state.phase = RoundPhase::Dispatching;

        let request_id = Uuid::new_v4();
        info!(
            "Round {} ({}) dispatched to {} providers [{}]",
            seq,
            kind.as_str(),
            api_keys.len(),
            request_id
        );

        Ok(RoundTicket {
            seq,
            request_id,
            kind,
            query: query.to_string(),
            request: QueryRequest {
                query: query.to_string(),
                api_keys,
                summarize,
            },
        })
    }

    /// Settle a dispatched round with the service result.
    ///
    /// A reply for anything but the latest round is discarded. A failed
    /// request resolves every pending slot as a transport error.
    pub fn settle_round(
        &self,
        ticket: &RoundTicket,
        result: Result<QueryReply>,
    ) -> Result<RoundOutcome> {
        let mut state = self.lock()?;

        if ticket.seq != state.latest_seq {
            warn!(
                "Discarding stale reply for round {} (latest is {}) [{}]",
                ticket.seq, state.latest_seq, ticket.request_id
            );
            return Ok(RoundOutcome::Stale {
                seq: ticket.seq,
                latest: state.latest_seq,
            });
        }

        state.phase = RoundPhase::Settling;
        let (settlement, failure) = match result {
            Ok(reply) => (state.aggregate.settle(&reply), None),
            Err(e) => {
                warn!("Round {} failed: {} [{}]", ticket.seq, e, ticket.request_id);
                (state.aggregate.fail_pending(), Some(e.to_string()))
            }
        };

        let now = Utc::now();
        state.aggregate.complete(RoundContext {
            query: ticket.query.clone(),
            kind: ticket.kind,
            seq: ticket.seq,
            failure: failure.clone(),
            completed_at: now,
        });
        state.phase = RoundPhase::Complete;
        if ticket.kind == RoundKind::TopLevel {
            state.history.record(&ticket.query, now)?;
        }

        info!(
            "Round {} complete: {} succeeded, {} failed, {} missing [{}]",
            ticket.seq,
            settlement.succeeded.len(),
            settlement.failed.len(),
            settlement.missing.len(),
            ticket.request_id
        );

        Ok(RoundOutcome::Complete(RoundReport {
            seq: ticket.seq,
            kind: ticket.kind,
            query: ticket.query.clone(),
            succeeded: settlement.succeeded,
            failed: settlement.failed,
            missing: settlement.missing,
            synthesis: settlement.synthesis,
            failure,
            clear_follow_up: ticket.kind == RoundKind::FollowUp,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::aggregate::{SlotState, NO_RESPONSE, TRANSPORT_ERROR};
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_example_round_success_and_error() {
        let (orch, service, _kv) = orchestrator_with(&[("openai", "sk-o"), ("anthropic", "sk-a")]);
        service.push_query(Ok(query_reply(
            r#"{
                "openai": {"status": "success", "content": "A"},
                "anthropic": {"status": "error", "content": "rate limited"}
            }"#,
        )));

        let outcome = orch.submit("  explain TCP ").await.unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.succeeded, vec!["openai"]);
        assert_eq!(report.failed, vec!["anthropic"]);
        assert!(!report.is_failure());

        let agg = orch.aggregate().unwrap();
        assert_eq!(
            agg.slot("openai").unwrap().state,
            SlotState::Success {
                content: "A".into(),
                sub_model: Some("gpt-4o".into())
            }
        );
        assert_eq!(
            agg.slot("anthropic").unwrap().state,
            SlotState::Error {
                message: "rate limited".into()
            }
        );
        assert_eq!(orch.phase().unwrap(), RoundPhase::Complete);
        assert_eq!(orch.history().unwrap()[0].query, "explain TCP");

        let sent = service.queries();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].query, "explain TCP");
        assert_eq!(sent[0].api_keys["anthropic"].model, "claude-3-opus-20240229");
        assert!(!sent[0].summarize);
    }

    #[tokio::test]
    async fn test_transport_failure_then_retry() {
        let (orch, service, _kv) = orchestrator_with(&[("openai", "sk-o"), ("anthropic", "sk-a")]);
        service.push_query(Err(Error::Transport("connection refused".into())));

        let outcome = orch.submit("explain TCP").await.unwrap();
        let report = outcome.report().unwrap();
        assert!(report.is_failure());
        assert_eq!(report.failed.len(), 2);

        let agg = orch.aggregate().unwrap();
        assert!(agg.slots().iter().all(|s| s.state
            == SlotState::Error {
                message: TRANSPORT_ERROR.into()
            }));
        assert!(agg.context().unwrap().failure.is_some());
        assert_eq!(orch.phase().unwrap(), RoundPhase::Complete);

        service.push_query(Ok(query_reply(
            r#"{
                "openai": {"status": "success", "content": "A"},
                "anthropic": {"status": "success", "content": "B"}
            }"#,
        )));
        let retried = orch.retry().await.unwrap();
        assert_eq!(retried.report().unwrap().kind, RoundKind::Retry);
        assert_eq!(service.queries()[1].query, "explain TCP");

        // Retry does not duplicate history
        assert_eq!(orch.history().unwrap().len(), 1);
    }

    #[test]
    fn test_guards_leave_state_untouched() {
        let (orch, service, _kv) = orchestrator_with(&[]);

        assert!(matches!(
            tokio_test::block_on(orch.submit("   ")),
            Err(Error::EmptyQuery)
        ));
        assert!(matches!(
            tokio_test::block_on(orch.submit("hi")),
            Err(Error::NoEligibleProvider)
        ));
        assert!(matches!(
            tokio_test::block_on(orch.retry()),
            Err(Error::NothingToRetry)
        ));

        assert_eq!(orch.phase().unwrap(), RoundPhase::Idle);
        assert!(service.queries().is_empty());
        assert!(orch.history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_provider_resolves_to_error() {
        let (orch, service, _kv) = orchestrator_with(&[("openai", "sk-o"), ("mistral", "sk-m")]);
        service.push_query(Ok(query_reply(
            r#"{"openai": {"status": "success", "content": "A", "model": "gpt-4o-2024"}}"#,
        )));

        let outcome = orch.submit("hello").await.unwrap();
        assert_eq!(outcome.report().unwrap().missing, vec!["mistral"]);

        let agg = orch.aggregate().unwrap();
        assert_eq!(
            agg.slot("mistral").unwrap().state,
            SlotState::Error {
                message: NO_RESPONSE.into()
            }
        );
        assert_eq!(
            agg.slot("openai").unwrap().state,
            SlotState::Success {
                content: "A".into(),
                sub_model: Some("gpt-4o-2024".into())
            }
        );
        assert!(agg.slots().iter().all(|s| !s.state.is_pending()));
    }

    #[test]
    fn test_stale_reply_is_discarded() {
        let (orch, _service, _kv) = orchestrator_with(&[("openai", "sk-o")]);

        let first = orch.begin_round("first", RoundKind::TopLevel).unwrap();
        let second = orch.begin_round("second", RoundKind::TopLevel).unwrap();
        assert!(second.seq > first.seq);

        let late = orch
            .settle_round(
                &first,
                Ok(query_reply(r#"{"openai": {"status": "success", "content": "old"}}"#)),
            )
            .unwrap();
        assert_eq!(
            late,
            RoundOutcome::Stale {
                seq: first.seq,
                latest: second.seq
            }
        );
        assert!(orch.aggregate().unwrap().slot("openai").unwrap().state.is_pending());
        assert_eq!(orch.phase().unwrap(), RoundPhase::Dispatching);

        orch.settle_round(
            &second,
            Ok(query_reply(r#"{"openai": {"status": "success", "content": "new"}}"#)),
        )
        .unwrap();
        let agg = orch.aggregate().unwrap();
        assert_eq!(
            agg.slot("openai").unwrap().state,
            SlotState::Success {
                content: "new".into(),
                sub_model: Some("gpt-4o".into())
            }
        );
        assert_eq!(agg.context().unwrap().query, "second");
        assert_eq!(orch.history().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_follow_up_clears_input_and_skips_history() {
        let (orch, service, _kv) = orchestrator_with(&[("openai", "sk-o")]);
        service.push_query(Ok(query_reply(r#"{"openai": {"status": "success", "content": "A"}}"#)));
        service.push_query(Ok(query_reply(r#"{"openai": {"status": "success", "content": "B"}}"#)));

        orch.submit("explain TCP").await.unwrap();
        let outcome = orch.follow_up("and UDP?").await.unwrap();

        let report = outcome.report().unwrap();
        assert!(report.clear_follow_up);
        assert_eq!(orch.aggregate().unwrap().context().unwrap().query, "and UDP?");
        assert_eq!(orch.history().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_inline_synthesis() {
        let (orch, service, _kv) = orchestrator_with(&[("openai", "sk-o"), ("anthropic", "sk-a")]);
        orch.set_synthesis_enabled(true).unwrap();
        service.push_query(Ok(query_reply(
            r#"{
                "openai": {"status": "success", "content": "A"},
                "anthropic": {"status": "success", "content": "B"},
                "summary": {"status": "success", "content": "Both agree", "model": "meta-summarizer"}
            }"#,
        )));

        let outcome = orch.submit("explain TCP").await.unwrap();
        assert!(service.queries()[0].summarize);
        assert_eq!(
            outcome.report().unwrap().synthesis,
            Some(SlotState::Success {
                content: "Both agree".into(),
                sub_model: Some("meta-summarizer".into())
            })
        );
    }

    #[test]
    fn test_synthesis_override_is_not_persisted() {
        let (orch, _service, kv) = orchestrator_with(&[("openai", "sk-o")]);
        orch.override_synthesis(Some(true)).unwrap();

        let ticket = orch.begin_round("hi", RoundKind::TopLevel).unwrap();
        assert!(ticket.request.summarize);
        assert!(!orch.synthesis_enabled().unwrap());
        assert!(kv.get("enable-summary").unwrap().is_none());

        orch.override_synthesis(None).unwrap();
        let ticket = orch.begin_round("hi", RoundKind::TopLevel).unwrap();
        assert!(!ticket.request.summarize);
    }

    #[test]
    fn test_ineligible_provider_keeps_vacant_slot() {
        let (orch, _service, _kv) = orchestrator_with(&[("openai", "sk-o"), ("local", "sk-l")]);

        let ticket = orch.begin_round("hi", RoundKind::TopLevel).unwrap();
        assert_eq!(ticket.request.api_keys.len(), 1);
        assert_eq!(
            orch.aggregate().unwrap().slot("local").unwrap().state,
            SlotState::Vacant
        );
    }

    #[test]
    fn test_remove_credential_evicts_and_destroys_slot() {
        let (orch, _service, kv) = orchestrator_with(&[("openai", "sk-o"), ("anthropic", "sk-a")]);
        orch.begin_round("hi", RoundKind::TopLevel).unwrap();

        assert!(orch.remove_credential("anthropic").unwrap());
        assert_eq!(orch.active_providers().unwrap(), vec!["openai"]);
        assert!(orch.aggregate().unwrap().slot("anthropic").is_none());
        assert!(kv.get("anthropic-key").unwrap().is_none());
        assert!(!orch.remove_credential("anthropic").unwrap());
    }

    #[test]
    fn test_failed_removal_keeps_key_and_activation_consistent() {
        let flaky = Arc::new(FlakyStore::default());
        flaky.set("openai-key", "sk-o").unwrap();
        flaky.set("active-models", r#"["openai"]"#).unwrap();
        let kv: Arc<dyn KeyValueStore> = flaky.clone();
        let orch = Orchestrator::new(
            Arc::new(FakeService::default()),
            kv,
            test_catalog(),
            OrchestratorConfig::default(),
        )
        .unwrap();

        flaky.fail_writes_to("active-models");
        assert!(orch.remove_credential("openai").is_err());
        assert_eq!(orch.active_providers().unwrap(), vec!["openai"]);
        assert!(orch.credential("openai").unwrap().is_some());
        assert_eq!(flaky.get("openai-key").unwrap(), Some("sk-o".into()));
    }

    #[tokio::test]
    async fn test_register_credential_validates_first() {
        let (orch, service, kv) = orchestrator_with(&[]);

        service.push_validation(false, "Invalid API key");
        let err = orch.register_credential("openai", "sk-bad").await.unwrap_err();
        assert!(matches!(err, Error::KeyRejected(ref m) if m == "Invalid API key"));
        assert!(kv.get("openai-key").unwrap().is_none());

        service.push_validation(true, "API key is valid");
        orch.register_credential("openai", " sk-good ").await.unwrap();
        assert_eq!(kv.get("openai-key").unwrap(), Some("sk-good".into()));
        assert_eq!(orch.active_providers().unwrap(), vec!["openai"]);

        let err = orch.register_credential("nope", "x").await.unwrap_err();
        assert!(matches!(err, Error::UnknownProvider(_)));
    }

    #[test]
    fn test_select_sub_model() {
        let (orch, _service, _kv) = orchestrator_with(&[("openai", "sk-o")]);

        orch.select_sub_model("openai", "gpt-3.5-turbo").unwrap();
        assert_eq!(
            orch.resolved_sub_model("openai").unwrap().as_deref(),
            Some("gpt-3.5-turbo")
        );
        assert!(matches!(
            orch.select_sub_model("openai", "gpt-9"),
            Err(Error::UnknownSubModel { .. })
        ));
        assert!(matches!(
            orch.select_sub_model("anthropic", "claude-3-haiku-20240307"),
            Err(Error::NoCredential(_))
        ));
        assert!(matches!(
            orch.select_sub_model("nope", "x"),
            Err(Error::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_activation_requires_credential() {
        let (orch, _service, _kv) = orchestrator_with(&[("openai", "sk-o")]);
        orch.deactivate("openai").unwrap();
        assert!(orch.aggregate().unwrap().slots().is_empty());

        assert!(matches!(orch.activate("anthropic"), Err(Error::NoCredential(_))));
        assert!(orch.activate("openai").unwrap());
        assert_eq!(orch.aggregate().unwrap().slots()[0].state, SlotState::Vacant);
    }

    #[test]
    fn test_state_reloads_from_store() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        kv.set("openai-key", "sk-o").unwrap();
        kv.set("active-models", r#"["openai","anthropic"]"#).unwrap();

        let orch = Orchestrator::new(
            Arc::new(FakeService::default()),
            kv.clone(),
            test_catalog(),
            OrchestratorConfig::default(),
        )
        .unwrap();

        assert_eq!(orch.active_providers().unwrap(), vec!["openai"]);
        assert_eq!(orch.aggregate().unwrap().slots().len(), 1);
        assert_eq!(kv.get("active-models").unwrap(), Some(r#"["openai"]"#.into()));
    }
}
