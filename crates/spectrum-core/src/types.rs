//! Shared types for spectrum-core.
//!
//! These types describe the provider catalog and the wire format of the
//! aggregation service. They are used by both the API client and the
//! orchestrator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Reply key that carries the cross-model synthesis instead of a provider.
pub const SUMMARY_KEY: &str = "summary";

/// Status string used by the aggregation service for a successful result.
pub const STATUS_SUCCESS: &str = "success";

// ─────────────────────────────────────────────────────────────────────────────
// Provider Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// A selectable sub-model of a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A provider as described by `GET /models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Filled from the catalog key; absent from the wire object.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub models: Vec<SubModel>,
    #[serde(default)]
    pub auth_type: String,
    #[serde(default)]
    pub auth_url: String,
    #[serde(default)]
    pub docs_url: String,
}

impl ProviderDescriptor {
    /// The first listed sub-model is the provider default.
    pub fn default_sub_model(&self) -> Option<&str> {
        self.models.first().map(|m| m.id.as_str())
    }

    pub fn has_sub_model(&self, model_id: &str) -> bool {
        self.models.iter().any(|m| m.id == model_id)
    }
}

/// Immutable provider catalog for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCatalog {
    providers: BTreeMap<String, ProviderDescriptor>,
}

impl ProviderCatalog {
    /// Build a catalog from the `GET /models` mapping, stamping each id.
    pub fn from_map(map: BTreeMap<String, ProviderDescriptor>) -> Self {
        let providers = map
            .into_iter()
            .map(|(id, mut descriptor)| {
                descriptor.id = id.clone();
                (id, descriptor)
            })
            .collect();
        Self { providers }
    }

    pub fn get(&self, provider: &str) -> Option<&ProviderDescriptor> {
        self.providers.get(provider)
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.providers.contains_key(provider)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Display name, falling back to the id for providers outside the catalog.
    pub fn display_name<'a>(&'a self, provider: &'a str) -> &'a str {
        self.get(provider).map_or(provider, |d| d.name.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

/// Key and sub-model sent for one provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderKey {
    pub key: String,
    pub model: String,
}

impl fmt::Debug for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderKey")
            .field("key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

/// `POST /validate-key`
#[derive(Clone, Serialize)]
pub struct ValidateKeyRequest {
    pub provider: String,
    pub api_key: String,
}

impl fmt::Debug for ValidateKeyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateKeyRequest")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// `POST /query`
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub api_keys: BTreeMap<String, ProviderKey>,
    pub summarize: bool,
}

/// One displayed response as sent to `/summarize` and `/export`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub content: String,
    pub model: String,
    pub status: String,
}

impl ResponseEntry {
    pub fn success(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            status: STATUS_SUCCESS.to_string(),
        }
    }
}

/// `POST /summarize`
#[derive(Debug, Clone, Serialize)]
pub struct SummarizeRequest {
    pub query: String,
    pub responses: BTreeMap<String, ResponseEntry>,
    pub api_keys: BTreeMap<String, ProviderKey>,
}

/// `POST /export`
#[derive(Debug, Clone, Serialize)]
pub struct ExportRequest {
    pub query: String,
    pub responses: BTreeMap<String, ResponseEntry>,
    pub summary: Option<ResponseEntry>,
    pub format: ExportFormat,
    pub include_summary: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Reply Types
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /validate-key` reply
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateKeyReply {
    pub valid: bool,
    #[serde(default)]
    pub message: String,
}

/// Per-provider (or summary) entry of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderReply {
    pub status: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub model: Option<String>,
}

impl ProviderReply {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// `POST /query` reply: provider entries keyed by id plus the optional summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, ProviderReply>")]
pub struct QueryReply {
    pub providers: BTreeMap<String, ProviderReply>,
    pub summary: Option<ProviderReply>,
}

impl From<BTreeMap<String, ProviderReply>> for QueryReply {
    fn from(mut providers: BTreeMap<String, ProviderReply>) -> Self {
        let summary = providers.remove(SUMMARY_KEY);
        Self { providers, summary }
    }
}

/// `POST /summarize` reply
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeReply {
    pub summary: ProviderReply,
}

/// `POST /export` reply
#[derive(Debug, Clone, Deserialize)]
pub struct ExportReply {
    pub status: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Markdown,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(Error::Other(format!("Unsupported export format: {other}"))),
        }
    }
}
