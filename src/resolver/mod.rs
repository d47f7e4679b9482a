//! URL resolution engine for turning hosting pages and embeds into playable media URLs.
//!
//! This module provides an extensible resolver system: independently
//! implemented plugins register routing metadata with a registry, a matcher
//! selects the plugins that claim a URL, and a dispatcher tries them in
//! priority order with per-attempt isolation and timeouts.
//!
//! # Architecture
//!
//! - [`ResolverDescriptor`] - Static routing metadata (domains, pattern, priority, flags)
//! - [`Resolver`] - Async trait that individual plugins implement
//! - [`ResolverRegistry`] - Shared, mutation-safe set of registered plugins
//! - [`Matcher`] - Finds and orders the candidates that claim a URL
//! - [`Dispatcher`] - Tries candidates in order and reports a [`ResolutionOutcome`]
//! - [`BatchCoordinator`] - Resolves many URLs concurrently, preserving input order
//! - [`DirectLinkResolver`] / [`GenericEmbedResolver`] - Built-in plugins
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use resolveurl_core::resolver::{
//!     DispatchOptions, Dispatcher, HttpSettings, build_default_resolver_registry,
//! };
//!
//! # async fn example() {
//! let registry = Arc::new(build_default_resolver_registry(&HttpSettings::default()));
//! let dispatcher = Dispatcher::new(registry, DispatchOptions::default());
//!
//! let outcome = dispatcher.resolve("https://cdn.example.com/clip.mp4").await;
//! println!("resolved: {:?}", outcome.resolved_url);
//! # }
//! ```

mod batch;
mod descriptor;
mod direct;
mod dispatcher;
mod error;
mod generic_embed;
mod http_client;
mod matcher;
mod outcome;
mod registry;
mod utils;

pub use batch::{
    BatchCoordinator, BatchError, BatchReport, DEFAULT_BATCH_CONCURRENCY, MAX_CONCURRENCY,
    MIN_CONCURRENCY, default_concurrency,
};
pub use descriptor::{
    Capabilities, DEFAULT_PRIORITY, DescriptorInfo, DomainClaim, ResolverDescriptor,
    WILDCARD_DOMAIN,
};
pub use direct::DirectLinkResolver;
pub use dispatcher::{DEFAULT_CANDIDATE_TIMEOUT, DispatchOptions, Dispatcher};
pub use error::{RegistryError, ResolveError};
pub use generic_embed::GenericEmbedResolver;
pub use http_client::HttpSettings;
pub use matcher::{Candidate, MatchKind, MatchResult, Matcher};
pub use outcome::{AttemptRecord, AttemptStatus, ErrorCategory, OutcomeError, ResolutionOutcome};
pub use registry::ResolverRegistry;
pub use utils::{canonical_host, host_matches_domain};

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

/// Builds the registry of built-in resolvers.
///
/// A built-in whose HTTP client cannot be constructed is skipped with a
/// warning so the remaining resolvers stay usable.
#[must_use]
pub fn build_default_resolver_registry(settings: &HttpSettings) -> ResolverRegistry {
    let registry = ResolverRegistry::new();

    match GenericEmbedResolver::new(settings) {
        Ok(resolver) => register_builtin(&registry, resolver),
        Err(error) => warn!(
            error = %error,
            "GenericEmbed resolver unavailable; continuing with remaining resolvers"
        ),
    }

    match DirectLinkResolver::new(settings) {
        Ok(resolver) => register_builtin(&registry, resolver),
        Err(error) => warn!(
            error = %error,
            "DirectLink resolver unavailable; continuing with remaining resolvers"
        ),
    }

    registry
}

fn register_builtin(registry: &ResolverRegistry, resolver: impl Resolver + 'static) {
    if let Err(error) = registry.register(std::sync::Arc::new(resolver)) {
        warn!(error = %error, "built-in resolver registration skipped");
    }
}

/// The URL a candidate was matched with, plus anything its pattern captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedUrl {
    /// The raw input URL.
    pub url: String,
    /// Host for the plugin: a captured `host` group, else the normalized URL host.
    pub host: String,
    /// Media identifier captured by the pattern, if any.
    pub media_id: Option<String>,
}

/// A successfully resolved media URL with optional metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    /// The direct, playable URL.
    pub url: String,
    /// Optional details discovered during resolution (content type, source page).
    pub metadata: HashMap<String, String>,
}

impl ResolvedUrl {
    /// Creates a new resolved URL with no metadata.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            metadata: HashMap::new(),
        }
    }

    /// Creates a new resolved URL with metadata.
    #[must_use]
    pub fn with_metadata(url: impl Into<String>, metadata: HashMap<String, String>) -> Self {
        Self {
            url: url.into(),
            metadata,
        }
    }
}

/// Per-call settings forwarded to plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveContext {
    /// Pick the first stream when a page offers several.
    pub auto_pick: bool,
}

impl ResolveContext {
    /// Creates a context with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self { auto_pick: true }
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait that all resolver plugins implement.
///
/// A plugin receives a URL it was matched with and either produces a direct
/// media URL or fails with [`ResolveError::CandidateFailure`]. The dispatcher
/// supplies the timeout and panic isolation, so plugins only describe the
/// happy path and their site-specific failures.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via `Arc<dyn Resolver>`.
/// Rust 2024 native async traits are not object-safe, so `async_trait` is required
/// for the registry pattern.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Returns the routing metadata for this plugin.
    fn descriptor(&self) -> ResolverDescriptor;

    /// Attempts to resolve the matched URL into a direct media URL.
    async fn resolve(
        &self,
        matched: &MatchedUrl,
        ctx: &ResolveContext,
    ) -> Result<ResolvedUrl, ResolveError>;
}
