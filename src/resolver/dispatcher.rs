//! Resolution engine that tries matched candidates in order.
//!
//! The [`Dispatcher`] asks the [`Matcher`] for ordered candidates, filters
//! them by the caller's [`DispatchOptions`], and tries them strictly one at a
//! time. Each attempt runs in its own task under a hard timeout, so a plugin
//! that errors, panics, or hangs is a recorded local failure and the loop
//! moves on to the next candidate.
//!
//! # Attempt lifecycle
//!
//! Every attempt goes `PENDING -> RUNNING -> {SUCCEEDED, FAILED, TIMED_OUT}`.
//! The resolution as a whole goes `STARTED -> RESOLVED` on the first success,
//! or `STARTED -> EXHAUSTED` once every candidate has failed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::outcome::{AttemptRecord, AttemptStatus, ResolutionOutcome};
use super::{
    Candidate, Matcher, ResolveContext, ResolveError, ResolvedUrl, ResolverRegistry,
};

/// Default execution budget for a single candidate attempt.
pub const DEFAULT_CANDIDATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Caller-controlled dispatch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Try resolvers flagged `universal`.
    pub allow_universal: bool,
    /// Try resolvers flagged `popup`.
    pub allow_popups: bool,
    /// Let plugins pick the first stream when a page offers several.
    pub auto_pick: bool,
    /// Hard budget for each candidate attempt.
    pub candidate_timeout: Duration,
    /// Upper bound on attempts per URL; `None` tries every candidate.
    pub max_candidates: Option<usize>,
}

impl DispatchOptions {
    /// Returns true if the candidate passes the capability filters.
    #[must_use]
    pub fn admits(&self, candidate: &Candidate) -> bool {
        let capabilities = candidate.descriptor.capabilities;
        (self.allow_universal || !capabilities.universal)
            && (self.allow_popups || !capabilities.popup)
    }

    fn context(&self) -> ResolveContext {
        ResolveContext {
            auto_pick: self.auto_pick,
        }
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            allow_universal: true,
            allow_popups: true,
            auto_pick: true,
            candidate_timeout: DEFAULT_CANDIDATE_TIMEOUT,
            max_candidates: None,
        }
    }
}

/// Resolves single URLs against a shared registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ResolverRegistry>,
    matcher: Matcher,
    options: DispatchOptions,
}

impl Dispatcher {
    /// Creates a dispatcher with default per-call options.
    #[must_use]
    pub fn new(registry: Arc<ResolverRegistry>, options: DispatchOptions) -> Self {
        Self {
            matcher: Matcher::new(Arc::clone(&registry)),
            registry,
            options,
        }
    }

    /// Returns the shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResolverRegistry> {
        &self.registry
    }

    /// Returns the matcher over the shared registry.
    #[must_use]
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Returns the options used by [`Dispatcher::resolve`].
    #[must_use]
    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Resolves `url` with the dispatcher's own options.
    pub async fn resolve(&self, url: &str) -> ResolutionOutcome {
        self.resolve_with(url, &self.options).await
    }

    /// Returns the candidates that would be tried for `url`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidUrl`] for malformed input.
    pub fn plan(&self, url: &str, options: &DispatchOptions) -> Result<Vec<Candidate>, ResolveError> {
        let matched = self.matcher.match_url(url)?;
        let limit = options.max_candidates.unwrap_or(usize::MAX);
        Ok(matched
            .candidates
            .into_iter()
            .filter(|candidate| options.admits(candidate))
            .take(limit)
            .collect())
    }

    /// Resolves `url` with explicit options.
    ///
    /// Never fails: invalid input, no match, and exhaustion all come back as
    /// an unsuccessful [`ResolutionOutcome`].
    #[instrument(skip(self, url, options), fields(url = %url))]
    pub async fn resolve_with(&self, url: &str, options: &DispatchOptions) -> ResolutionOutcome {
        let url = url.trim();
        let candidates = match self.plan(url, options) {
            Ok(candidates) => candidates,
            Err(error) => {
                debug!(error = %error, "Rejected input before matching");
                return ResolutionOutcome::failed(url, &error, Vec::new());
            }
        };

        if candidates.is_empty() {
            debug!("No resolver claims this URL");
            return ResolutionOutcome::failed(url, &ResolveError::no_resolver(url), Vec::new());
        }

        debug!(
            state = "STARTED",
            candidates = ?candidates.iter().map(Candidate::name).collect::<Vec<_>>(),
            "Dispatching"
        );

        let ctx = options.context();
        let mut attempts = Vec::with_capacity(candidates.len());
        let mut last_error: Option<ResolveError> = None;

        for candidate in &candidates {
            let started = Instant::now();
            debug!(resolver = candidate.name(), state = "RUNNING", "Trying resolver");

            match run_attempt(candidate, ctx, options.candidate_timeout).await {
                Ok(resolved) => {
                    attempts.push(AttemptRecord::new(
                        candidate.name(),
                        AttemptStatus::Succeeded,
                        None,
                        started.elapsed(),
                    ));
                    info!(
                        resolver = candidate.name(),
                        resolved_url = %resolved.url,
                        state = "RESOLVED",
                        "Resolution successful"
                    );
                    return ResolutionOutcome::resolved(
                        url,
                        resolved.url,
                        candidate.name(),
                        resolved.metadata,
                        attempts,
                    );
                }
                Err(error) => {
                    let status = if matches!(error, ResolveError::CandidateTimeout { .. }) {
                        warn!(resolver = candidate.name(), error = %error, state = "TIMED_OUT", "Resolver timed out, trying next");
                        AttemptStatus::TimedOut
                    } else {
                        debug!(resolver = candidate.name(), error = %error, state = "FAILED", "Resolver failed, trying next");
                        AttemptStatus::Failed
                    };
                    attempts.push(AttemptRecord::new(
                        candidate.name(),
                        status,
                        Some(error.to_string()),
                        started.elapsed(),
                    ));
                    last_error = Some(error);
                }
            }
        }

        let tried: Vec<String> = candidates
            .iter()
            .map(|candidate| candidate.name().to_string())
            .collect();
        let last_error = last_error.map_or_else(|| "no attempt completed".to_string(), |e| e.to_string());
        let error = ResolveError::exhausted(url, tried, last_error);
        info!(tried = candidates.len(), state = "EXHAUSTED", "All resolvers failed");
        ResolutionOutcome::failed(url, &error, attempts)
    }
}

/// A spawned candidate attempt that is aborted when dropped.
///
/// Dropping the dispatching future (a cancelled batch, a disconnected API
/// client) drops this guard, so the plugin never outlives its caller.
struct AttemptTask(JoinHandle<Result<ResolvedUrl, ResolveError>>);

impl Drop for AttemptTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Runs one candidate in its own task under `budget`.
///
/// The task is aborted on timeout, which drops the plugin's in-flight request.
async fn run_attempt(
    candidate: &Candidate,
    ctx: ResolveContext,
    budget: Duration,
) -> Result<ResolvedUrl, ResolveError> {
    let name = candidate.name();
    let resolver = candidate.resolver();
    let matched = candidate.matched.clone();
    let mut task = AttemptTask(tokio::spawn(async move {
        resolver.resolve(&matched, &ctx).await
    }));

    match tokio::time::timeout(budget, &mut task.0).await {
        Ok(Ok(Ok(mut resolved))) => {
            let trimmed = resolved.url.trim();
            if trimmed.is_empty() {
                return Err(ResolveError::candidate_failed(
                    name,
                    "resolver returned an empty URL",
                ));
            }
            resolved.url = trimmed.to_string();
            Ok(resolved)
        }
        Ok(Ok(Err(error))) => Err(attribute_error(error, name)),
        Ok(Err(join_error)) => {
            let reason = if join_error.is_panic() {
                "resolver panicked"
            } else {
                "resolver task was cancelled"
            };
            warn!(resolver = name, error = %join_error, "Resolver task ended abnormally");
            Err(ResolveError::candidate_failed(name, reason))
        }
        Err(_) => Err(ResolveError::candidate_timeout(name, budget)),
    }
}

/// Makes every plugin error a candidate error attributed to `name`.
fn attribute_error(error: ResolveError, name: &str) -> ResolveError {
    match error {
        ResolveError::CandidateFailure { reason, .. } => ResolveError::candidate_failed(name, reason),
        ResolveError::CandidateTimeout { timeout, .. } => ResolveError::candidate_timeout(name, timeout),
        other => ResolveError::candidate_failed(name, other.to_string()),
    }
}
