//! On-demand cross-model synthesis ("insights").
//!
//! Reads the successful slots of the displayed round, asks the service to
//! synthesize them and stores the result in the synthesis slot. Provider
//! slots are never touched.

use super::{Orchestrator, State};
use crate::aggregate::SlotState;
use crate::error::{Error, Result};
use crate::types::{ProviderKey, SummarizeRequest};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Minimum number of successful responses worth synthesizing.
pub const MIN_INSIGHT_RESPONSES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightOutcome {
    Synthesized {
        content: String,
        sub_model: Option<String>,
    },
    /// A newer round began while the synthesis was generated; it was dropped.
    Stale,
}

impl Orchestrator {
    /// Generate a synthesis of the displayed successful responses.
    ///
    /// Fails with [`Error::InsufficientResponses`] below two successes. On
    /// any failure the synthesis slot keeps its previous state.
    pub async fn request_insights(&self) -> Result<InsightOutcome> {
        let (request, seq) = {
            let state = self.lock()?;
            let found = state.aggregate.success_count();
            if found < MIN_INSIGHT_RESPONSES {
                return Err(Error::InsufficientResponses { found });
            }
            let query = state
                .aggregate
                .context()
                .map(|c| c.query.clone())
                .ok_or(Error::InsufficientResponses { found: 0 })?;

            let (driver, key) = self
                .synthesis_driver(&state)
                .ok_or(Error::NoEligibleProvider)?;
            debug!("Insights driven by {}", driver);

            let mut api_keys = BTreeMap::new();
            api_keys.insert(driver, key);
            let request = SummarizeRequest {
                query,
                responses: state.aggregate.success_entries(),
                api_keys,
            };
            (request, state.latest_seq)
        };

        let reply = self.service.summarize(&request).await?;

        let mut state = self.lock()?;
        if state.latest_seq != seq {
            warn!(
                "Discarding insights for round {} (latest is {})",
                seq, state.latest_seq
            );
            return Ok(InsightOutcome::Stale);
        }

        let summary = reply.summary;
        if !summary.is_success() {
            return Err(Error::SynthesisFailed(summary.content));
        }

        state.aggregate.set_synthesis(SlotState::Success {
            content: summary.content.clone(),
            sub_model: summary.model.clone(),
        });
        info!("Insights generated for round {}", seq);

        Ok(InsightOutcome::Synthesized {
            content: summary.content,
            sub_model: summary.model,
        })
    }

    /// The canonical provider whenever it holds a key, active or not, else
    /// the first active provider that can be dispatched.
    fn synthesis_driver(&self, state: &State) -> Option<(String, ProviderKey)> {
        let canonical = self.config.canonical_synthesis_provider.as_str();
        if let Some(key) = state.provider_key(canonical) {
            return Some((canonical.to_string(), key));
        }
        state
            .active
            .iter()
            .find_map(|p| state.provider_key(p).map(|key| (p.to_string(), key)))
    }
}
