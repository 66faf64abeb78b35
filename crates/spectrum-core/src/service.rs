//! Aggregation service boundary.
//!
//! The orchestrator depends only on this trait. [`crate::client::AggregatorClient`]
//! implements it over HTTP; tests supply scripted fakes.

use crate::error::Result;
use crate::types::{
    ExportReply, ExportRequest, ProviderCatalog, QueryReply, QueryRequest, SummarizeReply,
    SummarizeRequest, ValidateKeyReply, ValidateKeyRequest,
};
use async_trait::async_trait;

/// Backend that fans a query out to providers and generates syntheses and exports.
///
/// Every method is one request/response exchange. Network errors, non-2xx
/// statuses and undecodable bodies surface as transport errors
/// ([`crate::Error::is_transport`]).
#[async_trait]
pub trait AggregationService: Send + Sync {
    /// `GET /models`
    async fn list_models(&self) -> Result<ProviderCatalog>;

    /// `POST /validate-key`
    async fn validate_key(&self, request: &ValidateKeyRequest) -> Result<ValidateKeyReply>;

    /// `POST /query`
    async fn query(&self, request: &QueryRequest) -> Result<QueryReply>;

    /// `POST /summarize`
    async fn summarize(&self, request: &SummarizeRequest) -> Result<SummarizeReply>;

    /// `POST /export`
    async fn export(&self, request: &ExportRequest) -> Result<ExportReply>;
}
