//! Terminal results of resolving one URL.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use super::ResolveError;

/// Coarse failure category exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The input was not a usable URL.
    InvalidUrl,
    /// Nothing claimed the URL.
    NoResolverFound,
    /// Every candidate failed or timed out.
    ResolutionExhausted,
    /// The batch was cancelled before this URL finished.
    Cancelled,
    /// The resolution task ended unexpectedly.
    Internal,
}

impl ErrorCategory {
    /// Returns the stable label used in JSON and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::NoResolverFound => "no_resolver_found",
            Self::ResolutionExhausted => "resolution_exhausted",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        }
    }
}

/// Failure details attached to an unsuccessful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeError {
    pub category: ErrorCategory,
    pub message: String,
    /// Resolvers tried before giving up, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tried: Vec<String>,
}

impl From<&ResolveError> for OutcomeError {
    fn from(error: &ResolveError) -> Self {
        let (category, tried) = match error {
            ResolveError::InvalidUrl { .. } => (ErrorCategory::InvalidUrl, Vec::new()),
            ResolveError::NoResolverFound { .. } => (ErrorCategory::NoResolverFound, Vec::new()),
            ResolveError::ResolutionExhausted { tried, .. } => {
                (ErrorCategory::ResolutionExhausted, tried.clone())
            }
            ResolveError::Cancelled { .. } => (ErrorCategory::Cancelled, Vec::new()),
            // Candidate errors never surface alone; treat a stray one as exhaustion.
            ResolveError::CandidateFailure { resolver, .. }
            | ResolveError::CandidateTimeout { resolver, .. } => {
                (ErrorCategory::ResolutionExhausted, vec![resolver.clone()])
            }
        };
        Self {
            category,
            message: error.to_string(),
            tried,
        }
    }
}

/// Terminal state of one candidate attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Succeeded,
    Failed,
    TimedOut,
}

/// Diagnostic record of one candidate attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub resolver: String,
    pub status: AttemptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub elapsed_ms: u64,
}

impl AttemptRecord {
    pub(crate) fn new(
        resolver: &str,
        status: AttemptStatus,
        message: Option<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            resolver: resolver.to_string(),
            status,
            message,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// The complete, structured result of resolving one URL.
///
/// `resolved_url` and `resolver_used` are present iff `success`; `error` is
/// present iff not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionOutcome {
    pub original_url: String,
    pub success: bool,
    pub resolved_url: Option<String>,
    pub error: Option<OutcomeError>,
    pub resolver_used: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    pub attempts: Vec<AttemptRecord>,
}

impl ResolutionOutcome {
    /// Builds a successful outcome.
    #[must_use]
    pub fn resolved(
        original_url: impl Into<String>,
        resolved_url: impl Into<String>,
        resolver_used: impl Into<String>,
        metadata: HashMap<String, String>,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        Self {
            original_url: original_url.into(),
            success: true,
            resolved_url: Some(resolved_url.into()),
            error: None,
            resolver_used: Some(resolver_used.into()),
            metadata,
            attempts,
        }
    }

    /// Builds a failed outcome from the terminal error.
    #[must_use]
    pub fn failed(
        original_url: impl Into<String>,
        error: &ResolveError,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        Self::failed_with(original_url, OutcomeError::from(error), attempts)
    }

    /// Builds a failed outcome from an already categorized error.
    #[must_use]
    pub fn failed_with(
        original_url: impl Into<String>,
        error: OutcomeError,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        Self {
            original_url: original_url.into(),
            success: false,
            resolved_url: None,
            error: Some(error),
            resolver_used: None,
            metadata: HashMap::new(),
            attempts,
        }
    }

    /// Returns the failure category, if any.
    #[must_use]
    pub fn category(&self) -> Option<ErrorCategory> {
        self.error.as_ref().map(|error| error.category)
    }

    /// Returns a short human-readable summary.
    #[must_use]
    pub fn message(&self) -> String {
        match (&self.error, &self.resolver_used) {
            (None, Some(resolver)) => format!("URL resolved successfully by {resolver}"),
            (None, None) => "URL resolved successfully".to_string(),
            (Some(error), _) => match error.category {
                ErrorCategory::InvalidUrl => "The input is not a valid URL".to_string(),
                ErrorCategory::NoResolverFound => "No suitable resolver found".to_string(),
                ErrorCategory::ResolutionExhausted => {
                    format!("All {} matching resolver(s) failed", error.tried.len())
                }
                ErrorCategory::Cancelled => "Resolution was cancelled".to_string(),
                ErrorCategory::Internal => "Resolution ended unexpectedly".to_string(),
            },
        }
    }
}
