//! Error types for spectrum-core.

use thiserror::Error;

/// Result type alias using spectrum-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for spectrum operations
#[derive(Error, Debug)]
pub enum Error {
    // Guard rejections (reported before any state change)
    #[error("Query is empty")]
    EmptyQuery,

    #[error("No active provider has both an API key and a selected model")]
    NoEligibleProvider,

    #[error("Insights need at least two successful responses (have {found})")]
    InsufficientResponses { found: usize },

    #[error("Nothing to export: no successful response or summary is displayed")]
    NothingToExport,

    #[error("Nothing to retry: no query has been submitted yet")]
    NothingToRetry,

    // Provider/credential errors
    #[error("No API key stored for provider: {0}")]
    NoCredential(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown model {model} for provider {provider}")]
    UnknownSubModel { provider: String, model: String },

    #[error("API key rejected: {0}")]
    KeyRejected(String),

    // Aggregation service errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Aggregation service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed reply from aggregation service: {0}")]
    Parse(String),

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    // Storage errors
    #[cfg(feature = "db")]
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("State lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an API error from an HTTP status and response body
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Guard rejections carry no side effects and need no retry affordance.
    pub fn is_guard_rejection(&self) -> bool {
        matches!(
            self,
            Self::EmptyQuery
                | Self::NoEligibleProvider
                | Self::InsufficientResponses { .. }
                | Self::NothingToExport
                | Self::NothingToRetry
        )
    }

    /// Whole-request failures at the network boundary.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Api { .. } | Self::Parse(_))
    }
}
