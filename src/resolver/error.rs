//! Error types for resolver operations.
//!
//! This module defines structured errors for URL resolution and registry
//! management, following the What/Why/Fix pattern used across the project.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while resolving a URL.
///
/// `CandidateFailure` and `CandidateTimeout` describe a single plugin attempt
/// and never cross the dispatcher boundary on their own; they are recorded and
/// summarized inside `ResolutionExhausted`.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The input could not be parsed as an absolute URL with a host
    #[error("invalid URL '{input}': {reason}\n  Suggestion: Pass an absolute http(s) URL such as https://host/path")]
    InvalidUrl {
        /// The rejected input
        input: String,
        /// Why parsing failed
        reason: String,
    },

    /// No enabled resolver claims the URL
    #[error("no resolver found for '{input}': {reason}\n  Suggestion: {suggestion}")]
    NoResolverFound {
        /// The URL nobody claimed
        input: String,
        /// Why no resolver matched
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// A single resolver attempt failed
    #[error("resolver '{resolver}' failed: {reason}")]
    CandidateFailure {
        /// Name of the resolver that failed
        resolver: String,
        /// Why the attempt failed
        reason: String,
    },

    /// A single resolver attempt exceeded its execution budget
    #[error("resolver '{resolver}' timed out after {}ms", timeout.as_millis())]
    CandidateTimeout {
        /// Name of the resolver that timed out
        resolver: String,
        /// The budget that was exceeded
        timeout: Duration,
    },

    /// Every candidate was tried and none produced a URL
    #[error(
        "all resolvers failed for '{input}': tried {} resolver(s) [{}]; last error: {last_error}\n  Suggestion: Check the URL is still online or enable more resolvers",
        tried.len(),
        tried.join(", ")
    )]
    ResolutionExhausted {
        /// The URL that could not be resolved
        input: String,
        /// Names of the resolvers tried, in order
        tried: Vec<String>,
        /// Message of the final failed attempt
        last_error: String,
    },

    /// Resolution was abandoned because the caller cancelled the batch
    #[error("resolution of '{input}' was cancelled before it completed")]
    Cancelled {
        /// The URL whose resolution was abandoned
        input: String,
    },
}

impl ResolveError {
    /// Creates an `InvalidUrl` error.
    #[must_use]
    pub fn invalid_url(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a `NoResolverFound` error for a URL with no matching resolver.
    #[must_use]
    pub fn no_resolver(input: &str) -> Self {
        Self::NoResolverFound {
            input: input.to_string(),
            reason: "no enabled resolver claims this host or pattern".to_string(),
            suggestion: "Check the URL or enable a resolver for this host".to_string(),
        }
    }

    /// Creates a `CandidateFailure` error.
    ///
    /// Plugins use this to report any site-side problem (network, parse, block).
    #[must_use]
    pub fn candidate_failed(resolver: &str, reason: impl Into<String>) -> Self {
        Self::CandidateFailure {
            resolver: resolver.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a `CandidateTimeout` error.
    #[must_use]
    pub fn candidate_timeout(resolver: &str, timeout: Duration) -> Self {
        Self::CandidateTimeout {
            resolver: resolver.to_string(),
            timeout,
        }
    }

    /// Creates a `ResolutionExhausted` error.
    #[must_use]
    pub fn exhausted(input: &str, tried: Vec<String>, last_error: impl Into<String>) -> Self {
        Self::ResolutionExhausted {
            input: input.to_string(),
            tried,
            last_error: last_error.into(),
        }
    }

    /// Creates a `Cancelled` error.
    #[must_use]
    pub fn cancelled(input: &str) -> Self {
        Self::Cancelled {
            input: input.to_string(),
        }
    }

    /// Returns true for errors describing one candidate attempt.
    #[must_use]
    pub fn is_candidate_error(&self) -> bool {
        matches!(
            self,
            Self::CandidateFailure { .. } | Self::CandidateTimeout { .. }
        )
    }
}

/// Errors from registry mutation.
///
/// These are configuration mistakes: fatal to the registration step, never to
/// resolutions already in flight.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A resolver with this name is already registered
    #[error("resolver '{name}' is already registered\n  Suggestion: Give each resolver a unique name")]
    DuplicateName {
        /// The conflicting name
        name: String,
    },

    /// No resolver with this name is registered
    #[error("resolver '{name}' is not registered\n  Suggestion: List resolvers to see the available names")]
    NotFound {
        /// The unknown name
        name: String,
    },
}
