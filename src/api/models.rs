//! Request and response bodies for the HTTP layer.
//!
//! ```json
//! POST /api/resolve {"url": "https://youtu.be/dQw4w9WgXcQ"}
//!
//! {
//!   "success": true,
//!   "original_url": "https://youtu.be/dQw4w9WgXcQ",
//!   "resolved_url": "https://cdn.example.com/dQw4w9WgXcQ.mp4",
//!   "error": null,
//!   "message": "URL resolved successfully by YouTube",
//!   "resolver_used": "YouTube"
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::resolver::{AttemptRecord, DescriptorInfo, ErrorCategory, ResolutionOutcome};

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRequest {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveManyRequest {
    pub urls: Vec<String>,
}

/// Per-URL result envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    pub success: bool,
    pub original_url: String,
    pub resolved_url: Option<String>,
    pub error: Option<String>,
    pub message: String,
    pub resolver_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    pub attempts: Vec<AttemptRecord>,
}

impl From<ResolutionOutcome> for ResolveResponse {
    fn from(outcome: ResolutionOutcome) -> Self {
        let message = outcome.message();
        let category = outcome.category();
        Self {
            success: outcome.success,
            original_url: outcome.original_url,
            resolved_url: outcome.resolved_url,
            error: outcome.error.map(|error| error.message),
            message,
            resolver_used: outcome.resolver_used,
            category,
            metadata: outcome.metadata,
            attempts: outcome.attempts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveManyResponse {
    pub results: Vec<ResolveResponse>,
    pub total: usize,
    pub successful: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub enabled_only: Option<String>,
}

impl ListQuery {
    /// Only a case-insensitive `true` enables the filter.
    #[must_use]
    pub fn enabled_only(&self) -> bool {
        self.enabled_only
            .as_deref()
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolverListResponse {
    pub resolvers: Vec<DescriptorInfo>,
    pub count: usize,
    pub total_available: usize,
    pub enabled_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub domain: String,
    pub resolvers: Vec<DescriptorInfo>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub resolvers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub error: String,
}
