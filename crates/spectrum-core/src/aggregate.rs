//! Response aggregate: the record of what is currently displayed.
//!
//! One [`ResponseSlot`] per active provider (in activation order), an optional
//! synthesis slot and the [`RoundContext`] of the round that produced them.
//! Insights and export read from here, never from rendered output.

use crate::types::{ProviderReply, QueryReply, ResponseEntry};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::warn;

/// Error message for a provider the reply did not mention.
pub const NO_RESPONSE: &str = "no response received";

/// Error message for slots resolved by a whole-request failure.
pub const TRANSPORT_ERROR: &str = "transport";

/// Per-slot lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    /// Active provider that has not taken part in a round yet.
    Vacant,
    Pending,
    Success {
        content: String,
        sub_model: Option<String>,
    },
    Error {
        message: String,
    },
}

impl SlotState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SlotState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SlotState::Success { .. })
    }

    fn error(message: impl Into<String>) -> Self {
        SlotState::Error {
            message: message.into(),
        }
    }

    /// Resolve from a reply entry. The reply's model wins over the requested one.
    fn from_reply(reply: &ProviderReply, requested: Option<&str>) -> Self {
        if reply.is_success() {
            SlotState::Success {
                content: reply.content.clone(),
                sub_model: reply.model.clone().or_else(|| requested.map(str::to_string)),
            }
        } else {
            SlotState::error(reply.content.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSlot {
    pub provider: String,
    /// Sub-model sent with the request, if the provider was dispatched.
    pub requested_model: Option<String>,
    pub state: SlotState,
}

/// How a round was started. Only top-level rounds enter the query history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundKind {
    TopLevel,
    FollowUp,
    /// Resubmission of the displayed query.
    Retry,
}

impl RoundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundKind::TopLevel => "top-level",
            RoundKind::FollowUp => "follow-up",
            RoundKind::Retry => "retry",
        }
    }
}

/// The query behind the displayed slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundContext {
    pub query: String,
    pub kind: RoundKind,
    pub seq: u64,
    /// Set when the whole request failed; carries the transport detail.
    pub failure: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// A provider taking part in a round, as planned by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSlot {
    pub provider: String,
    /// `None` for active providers that cannot be dispatched.
    pub model: Option<String>,
}

/// Counts produced by settling a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settlement {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    /// Dispatched providers the reply did not mention.
    pub missing: Vec<String>,
    /// Final synthesis state, if one is displayed.
    pub synthesis: Option<SlotState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseAggregate {
    slots: Vec<ResponseSlot>,
    synthesis: Option<SlotState>,
    context: Option<RoundContext>,
}

impl ResponseAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[ResponseSlot] {
        &self.slots
    }

    pub fn slot(&self, provider: &str) -> Option<&ResponseSlot> {
        self.slots.iter().find(|s| s.provider == provider)
    }

    pub fn synthesis(&self) -> Option<&SlotState> {
        self.synthesis.as_ref()
    }

    pub fn context(&self) -> Option<&RoundContext> {
        self.context.as_ref()
    }

    /// Add a vacant slot for a newly activated provider.
    pub fn placeholder(&mut self, provider: &str) {
        if self.slot(provider).is_none() {
            self.slots.push(ResponseSlot {
                provider: provider.to_string(),
                requested_model: None,
                state: SlotState::Vacant,
            });
        }
    }

    /// Destroy a provider's slot. Returns whether one existed.
    pub fn remove(&mut self, provider: &str) -> bool {
        let before = self.slots.len();
        self.slots.retain(|s| s.provider != provider);
        self.slots.len() != before
    }

    /// Replace the slots for a new round.
    ///
    /// Dispatched providers become Pending, the rest Vacant. The previous
    /// context is dropped since the displayed slots no longer belong to it.
    pub fn begin(&mut self, plan: &[PlannedSlot], synthesis: bool) {
        self.slots = plan
            .iter()
            .map(|p| ResponseSlot {
                provider: p.provider.clone(),
                requested_model: p.model.clone(),
                state: if p.model.is_some() {
                    SlotState::Pending
                } else {
                    SlotState::Vacant
                },
            })
            .collect();
        self.synthesis = synthesis.then_some(SlotState::Pending);
        self.context = None;
    }

    /// Distribute a reply into the pending slots.
    pub fn settle(&mut self, reply: &QueryReply) -> Settlement {
        let mut settlement = Settlement::default();

        for key in reply.providers.keys() {
            let dispatched = self
                .slot(key)
                .is_some_and(|s| s.state.is_pending());
            if !dispatched {
                warn!("Ignoring reply entry for undispatched provider {}", key);
            }
        }

        for slot in self.slots.iter_mut().filter(|s| s.state.is_pending()) {
            match reply.providers.get(&slot.provider) {
                Some(entry) => {
                    slot.state = SlotState::from_reply(entry, slot.requested_model.as_deref());
                    if slot.state.is_success() {
                        settlement.succeeded.push(slot.provider.clone());
                    } else {
                        settlement.failed.push(slot.provider.clone());
                    }
                }
                None => {
                    slot.state = SlotState::error(NO_RESPONSE);
                    settlement.missing.push(slot.provider.clone());
                }
            }
        }

        if self.synthesis.as_ref().is_some_and(SlotState::is_pending) {
            self.synthesis = reply
                .summary
                .as_ref()
                .map(|summary| SlotState::from_reply(summary, None));
        }
        settlement.synthesis = self.synthesis.clone();
        settlement
    }

    /// Resolve every pending slot, synthesis included, as a transport failure.
    pub fn fail_pending(&mut self) -> Settlement {
        let mut settlement = Settlement::default();
        for slot in self.slots.iter_mut().filter(|s| s.state.is_pending()) {
            slot.state = SlotState::error(TRANSPORT_ERROR);
            settlement.failed.push(slot.provider.clone());
        }
        if let Some(synthesis) = self.synthesis.as_mut().filter(|s| s.is_pending()) {
            *synthesis = SlotState::error(TRANSPORT_ERROR);
        }
        settlement.synthesis = self.synthesis.clone();
        settlement
    }

    pub fn complete(&mut self, context: RoundContext) {
        self.context = Some(context);
    }

    pub fn set_synthesis(&mut self, state: SlotState) {
        self.synthesis = Some(state);
    }

    pub fn success_count(&self) -> usize {
        self.slots.iter().filter(|s| s.state.is_success()).count()
    }

    /// Successful responses keyed by provider, in wire form.
    pub fn success_entries(&self) -> BTreeMap<String, ResponseEntry> {
        self.slots
            .iter()
            .filter_map(|slot| match &slot.state {
                SlotState::Success { content, sub_model } => Some((
                    slot.provider.clone(),
                    ResponseEntry::success(content.clone(), sub_model.clone().unwrap_or_default()),
                )),
                _ => None,
            })
            .collect()
    }

    /// The synthesis in wire form, if it succeeded.
    pub fn synthesis_entry(&self) -> Option<ResponseEntry> {
        match &self.synthesis {
            Some(SlotState::Success { content, sub_model }) => Some(ResponseEntry::success(
                content.clone(),
                sub_model.clone().unwrap_or_default(),
            )),
            _ => None,
        }
    }

    /// At least one successful provider response or a successful synthesis.
    pub fn has_exportable(&self) -> bool {
        self.success_count() > 0 || self.synthesis_entry().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(entries: &[(&str, Option<&str>)]) -> Vec<PlannedSlot> {
        entries
            .iter()
            .map(|(p, m)| PlannedSlot {
                provider: p.to_string(),
                model: m.map(str::to_string),
            })
            .collect()
    }

    fn reply(body: &str) -> QueryReply {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_begin_marks_dispatched_providers_pending() {
        let mut agg = ResponseAggregate::new();
        agg.begin(&plan(&[("openai", Some("gpt-4o")), ("local", None)]), true);

        assert!(agg.slot("openai").unwrap().state.is_pending());
        assert_eq!(agg.slot("local").unwrap().state, SlotState::Vacant);
        assert_eq!(agg.synthesis(), Some(&SlotState::Pending));
        assert!(agg.context().is_none());
    }

    #[test]
    fn test_settle_resolves_every_pending_slot() {
        let mut agg = ResponseAggregate::new();
        agg.begin(
            &plan(&[
                ("openai", Some("gpt-4o")),
                ("anthropic", Some("claude-3-opus-20240229")),
                ("mistral", Some("mistral-large-latest")),
            ]),
            false,
        );

        let settlement = agg.settle(&reply(
            r#"{
                "openai": {"status": "success", "content": "A"},
                "anthropic": {"status": "error", "content": "rate limited"},
                "cohere": {"status": "success", "content": "stray"}
            }"#,
        ));

        assert_eq!(settlement.succeeded, vec!["openai"]);
        assert_eq!(settlement.failed, vec!["anthropic"]);
        assert_eq!(settlement.missing, vec!["mistral"]);
        assert_eq!(
            agg.slot("openai").unwrap().state,
            SlotState::Success {
                content: "A".into(),
                sub_model: Some("gpt-4o".into())
            }
        );
        assert_eq!(
            agg.slot("mistral").unwrap().state,
            SlotState::Error {
                message: NO_RESPONSE.into()
            }
        );
        assert!(agg.slot("cohere").is_none());
        assert!(agg.slots().iter().all(|s| !s.state.is_pending()));
    }

    #[test]
    fn test_missing_summary_clears_synthesis() {
        let mut agg = ResponseAggregate::new();
        agg.begin(&plan(&[("openai", Some("gpt-4o"))]), true);
        agg.settle(&reply(r#"{"openai": {"status": "success", "content": "A"}}"#));
        assert!(agg.synthesis().is_none());

        agg.begin(&plan(&[("openai", Some("gpt-4o"))]), true);
        agg.settle(&reply(
            r#"{
                "openai": {"status": "success", "content": "A"},
                "summary": {"status": "error", "content": "Need at least 2 successful responses to generate a summary"}
            }"#,
        ));
        assert!(matches!(agg.synthesis(), Some(SlotState::Error { .. })));
        assert!(agg.has_exportable());
    }

    #[test]
    fn test_fail_pending_marks_transport() {
        let mut agg = ResponseAggregate::new();
        agg.begin(
            &plan(&[("openai", Some("gpt-4o")), ("anthropic", Some("claude-3-haiku-20240307"))]),
            true,
        );

        let settlement = agg.fail_pending();
        assert_eq!(settlement.failed.len(), 2);
        assert!(agg.slots().iter().all(|s| s.state
            == SlotState::Error {
                message: TRANSPORT_ERROR.into()
            }));
        assert_eq!(
            agg.synthesis(),
            Some(&SlotState::Error {
                message: TRANSPORT_ERROR.into()
            })
        );
        assert!(!agg.has_exportable());
    }

    #[test]
    fn test_placeholder_and_remove() {
        let mut agg = ResponseAggregate::new();
        agg.placeholder("openai");
        agg.placeholder("openai");
        assert_eq!(agg.slots().len(), 1);

        assert!(agg.remove("openai"));
        assert!(!agg.remove("openai"));
        assert!(agg.slots().is_empty());
    }
}
