//! Round bookkeeping: phases, tickets and outcomes.

use crate::aggregate::{RoundKind, SlotState};
use crate::types::QueryRequest;
use uuid::Uuid;

/// Phase of the latest round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// No round has started this session.
    Idle,
    /// Request sent, slots pending.
    Dispatching,
    /// Reply being distributed into slots.
    Settling,
    /// Every slot terminal.
    Complete,
}

impl RoundPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundPhase::Idle => "idle",
            RoundPhase::Dispatching => "dispatching",
            RoundPhase::Settling => "settling",
            RoundPhase::Complete => "complete",
        }
    }
}

/// A dispatched round, handed back to [`super::Orchestrator::settle_round`]
/// together with the service result.
#[derive(Debug, Clone)]
pub struct RoundTicket {
    pub seq: u64,
    /// Correlation id for logs.
    pub request_id: Uuid,
    pub kind: RoundKind,
    pub query: String,
    pub request: QueryRequest,
}

/// Summary of a completed round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub seq: u64,
    pub kind: RoundKind,
    pub query: String,
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    /// Dispatched providers absent from the reply.
    pub missing: Vec<String>,
    pub synthesis: Option<SlotState>,
    /// Whole-round transport failure detail.
    pub failure: Option<String>,
    /// The follow-up input should be cleared.
    pub clear_follow_up: bool,
}

impl RoundReport {
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Complete(RoundReport),
    /// A newer round started before this reply arrived; nothing was changed.
    Stale { seq: u64, latest: u64 },
}

impl RoundOutcome {
    pub fn report(&self) -> Option<&RoundReport> {
        match self {
            RoundOutcome::Complete(report) => Some(report),
            RoundOutcome::Stale { .. } => None,
        }
    }
}
