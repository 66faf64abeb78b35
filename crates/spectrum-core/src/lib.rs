//! spectrum-core - Core library for Spectrum
//!
//! Fans one natural-language query out to several AI providers through an
//! aggregation service and tracks every provider's answer independently:
//!
//! - **orchestrator**: round lifecycle, retry, follow-up, insights, export
//! - **aggregate**: what is currently displayed (slots, synthesis, context)
//! - **credentials** / **selection** / **history** / **settings**: persisted client state
//! - **store**: flat key-value persistence (SQLite or in-memory)
//! - **service** / **client**: the aggregation service boundary and its HTTP client
//! - **classify**: display categories for provider errors

pub mod aggregate;
pub mod classify;
#[cfg(feature = "client")]
pub mod client;
pub mod credentials;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod selection;
pub mod service;
pub mod settings;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use aggregate::{ResponseAggregate, ResponseSlot, RoundContext, RoundKind, SlotState};
pub use classify::ProviderErrorKind;
#[cfg(feature = "client")]
pub use client::AggregatorClient;
pub use credentials::Credential;
pub use error::{Error, Result};
pub use history::QueryRecord;
pub use orchestrator::{
    ExportArtifact, InsightOutcome, Orchestrator, OrchestratorConfig, RoundOutcome, RoundPhase,
    RoundReport,
};
pub use service::AggregationService;
pub use store::{KeyValueStore, MemoryStore};
#[cfg(feature = "db")]
pub use store::SqliteStore;
pub use types::{ExportFormat, ProviderCatalog, ProviderDescriptor};
