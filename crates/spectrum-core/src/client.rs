//! HTTP client for the aggregation service.
//!
//! # Usage
//!
//! ```rust,no_run
//! use spectrum_core::client::AggregatorClient;
//! use spectrum_core::AggregationService;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> spectrum_core::Result<()> {
//!     let client = AggregatorClient::new("http://localhost:5001/api", Duration::from_secs(120))?;
//!     let catalog = client.list_models().await?;
//!     println!("{} providers", catalog.len());
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::service::AggregationService;
use crate::types::*;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Default base URL of a locally running aggregation service
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/api";

/// Client for the aggregation service
#[derive(Clone)]
pub struct AggregatorClient {
    /// Base URL, without trailing slash
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl AggregatorClient {
    /// Create a client. `timeout` bounds every request, including provider fan-out.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(reqwest::Method::GET, path, Option::<()>::None).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.request(reqwest::Method::POST, path, Some(body)).await
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        // Bodies carry API keys; only the route is logged
        debug!("Aggregator request: {} {}", method, url);

        let mut req = self.client.request(method, &url);
        if let Some(ref b) = body {
            req = req.json(b);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{}: {}", url, e)))?;

        let status = resp.status();
        debug!("Aggregator response: {} {}", status.as_u16(), path);

        if status.is_success() {
            let data: T = resp
                .json()
                .await
                .map_err(|e| Error::Parse(format!("{}: {}", path, e)))?;
            Ok(data)
        } else {
            let error_text = resp.text().await.unwrap_or_default();
            Err(Error::api(status.as_u16(), error_text))
        }
    }
}

#[async_trait]
impl AggregationService for AggregatorClient {
    async fn list_models(&self) -> Result<ProviderCatalog> {
        let map: BTreeMap<String, ProviderDescriptor> = self.get("/models").await?;
        Ok(ProviderCatalog::from_map(map))
    }

    async fn validate_key(&self, request: &ValidateKeyRequest) -> Result<ValidateKeyReply> {
        self.post("/validate-key", request).await
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryReply> {
        self.post("/query", request).await
    }

    async fn summarize(&self, request: &SummarizeRequest) -> Result<SummarizeReply> {
        self.post("/summarize", request).await
    }

    async fn export(&self, request: &ExportRequest) -> Result<ExportReply> {
        self.post("/export", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = AggregatorClient::new("http://localhost:5001/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5001/api");
    }
}
