//! Display classification of per-provider error messages.

use serde::Serialize;
use std::fmt;

/// Coarse category of a provider failure, derived from its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    Auth,
    RateLimit,
    ModelNotFound,
    InvalidRequest,
    Api,
}

const AUTH: &[&str] = &["unauthorized", "invalid key", "authentication", "auth"];
const RATE_LIMIT: &[&str] = &["rate limit", "too many requests", "quota"];
const MODEL_NOT_FOUND: &[&str] = &["model not found", "does not exist", "invalid model"];
const INVALID_REQUEST: &[&str] = &["bad request", "invalid request", "missing field"];

impl ProviderErrorKind {
    /// Classify an error message. Rules are checked in order; the first match wins.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        let any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if any(AUTH) {
            ProviderErrorKind::Auth
        } else if any(RATE_LIMIT) {
            ProviderErrorKind::RateLimit
        } else if any(MODEL_NOT_FOUND) {
            ProviderErrorKind::ModelNotFound
        } else if any(INVALID_REQUEST) {
            ProviderErrorKind::InvalidRequest
        } else {
            ProviderErrorKind::Api
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::Auth => "auth",
            ProviderErrorKind::RateLimit => "rate_limit",
            ProviderErrorKind::ModelNotFound => "model_not_found",
            ProviderErrorKind::InvalidRequest => "invalid_request",
            ProviderErrorKind::Api => "api_error",
        }
    }

    /// Short hint shown next to the raw message.
    pub fn hint(&self) -> &'static str {
        match self {
            ProviderErrorKind::Auth => "Authentication failed. Check the API key.",
            ProviderErrorKind::RateLimit => "Rate limit exceeded. Try again later.",
            ProviderErrorKind::ModelNotFound => "The selected model was not found.",
            ProviderErrorKind::InvalidRequest => "The provider rejected the request.",
            ProviderErrorKind::Api => "Error communicating with the provider API.",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
