//! Matching of URLs against registered resolver claims.
//!
//! The [`Matcher`] parses a URL, normalizes its host, and collects every
//! enabled resolver that claims it by domain, by pattern, or by wildcard. The
//! resulting candidates are ordered by priority, then specific claims before
//! wildcard claims, then registration order.

use std::sync::Arc;

use regex::Captures;
use tracing::debug;
use url::Url;

use super::registry::RegistryEntry;
use super::utils::{canonical_host, host_matches_domain};
use super::{DomainClaim, MatchedUrl, ResolveError, Resolver, ResolverDescriptor, ResolverRegistry};

/// How a candidate claimed the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// The host equals or is a subdomain of a claimed domain.
    Domain,
    /// The raw URL matched the descriptor's pattern.
    Pattern,
    /// Only the wildcard claim applied.
    Wildcard,
}

impl MatchKind {
    /// Domain and pattern matches outrank wildcard matches at equal priority.
    #[must_use]
    pub fn is_specific(self) -> bool {
        !matches!(self, Self::Wildcard)
    }
}

/// A resolver eligible to be tried for a URL.
#[derive(Clone)]
pub struct Candidate {
    entry: Arc<RegistryEntry>,
    /// Descriptor as it was when the match was taken.
    pub descriptor: ResolverDescriptor,
    /// URL details handed to the plugin.
    pub matched: MatchedUrl,
    /// How the claim was made.
    pub kind: MatchKind,
}

impl Candidate {
    /// Returns the resolver name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub(crate) fn resolver(&self) -> Arc<dyn Resolver> {
        Arc::clone(&self.entry.resolver)
    }

    fn sort_key(&self) -> (i32, bool, usize) {
        (
            self.descriptor.priority,
            !self.kind.is_specific(),
            self.entry.order,
        )
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("name", &self.descriptor.name)
            .field("priority", &self.descriptor.priority)
            .field("kind", &self.kind)
            .field("matched", &self.matched)
            .finish()
    }
}

/// The ordered candidates claiming one URL.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The raw input URL.
    pub url: String,
    /// The normalized host used for domain comparison.
    pub host: String,
    /// Candidates in the order they must be tried.
    pub candidates: Vec<Candidate>,
}

impl MatchResult {
    /// Returns true when nothing claims the URL.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Returns the candidate names in try order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.candidates.iter().map(Candidate::name).collect()
    }
}

/// Finds the registry entries that claim a URL.
#[derive(Debug, Clone)]
pub struct Matcher {
    registry: Arc<ResolverRegistry>,
}

impl Matcher {
    /// Creates a matcher over a shared registry.
    #[must_use]
    pub fn new(registry: Arc<ResolverRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the ordered candidates for `url`.
    ///
    /// An empty candidate list is a normal result, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidUrl`] if `url` is not an absolute URL
    /// with a host.
    #[tracing::instrument(skip(self))]
    pub fn match_url(&self, url: &str) -> Result<MatchResult, ResolveError> {
        let raw = url.trim();
        let parsed = Url::parse(raw).map_err(|e| ResolveError::invalid_url(raw, e.to_string()))?;
        let host = parsed
            .host_str()
            .map(canonical_host)
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ResolveError::invalid_url(raw, "URL has no host"))?;

        let mut candidates: Vec<Candidate> = self
            .registry
            .entries()
            .into_iter()
            .filter(|entry| entry.is_enabled())
            .filter_map(|entry| claim(entry, raw, &host))
            .collect();
        candidates.sort_by_key(Candidate::sort_key);

        debug!(
            host = %host,
            candidates = ?candidates.iter().map(Candidate::name).collect::<Vec<_>>(),
            "Matched candidates"
        );

        Ok(MatchResult {
            url: raw.to_string(),
            host,
            candidates,
        })
    }

    /// Returns descriptors, enabled or not, with a concrete domain claim
    /// related to `query`.
    ///
    /// A claim is related when it contains the query text or when the query,
    /// read as a host, falls under the claimed domain. Wildcard claims never
    /// match a search.
    #[must_use]
    pub fn search_domain(&self, query: &str) -> Vec<ResolverDescriptor> {
        let query = canonical_host(query);
        if query.is_empty() {
            return Vec::new();
        }

        self.registry
            .entries()
            .into_iter()
            .filter(|entry| {
                entry.descriptor.domains.iter().any(|claim| match claim {
                    DomainClaim::Any => false,
                    DomainClaim::Host(domain) => {
                        domain.contains(query.as_str()) || host_matches_domain(&query, domain)
                    }
                })
            })
            .map(|entry| entry.snapshot())
            .collect()
    }
}

fn claim(entry: Arc<RegistryEntry>, raw: &str, host: &str) -> Option<Candidate> {
    let descriptor = entry.snapshot();
    let domain_hit = descriptor.domains.iter().any(|claim| match claim {
        DomainClaim::Host(domain) => host_matches_domain(host, domain),
        DomainClaim::Any => false,
    });
    let captures = descriptor
        .pattern
        .as_ref()
        .and_then(|pattern| pattern.captures(raw));

    let kind = if domain_hit {
        MatchKind::Domain
    } else if captures.is_some() {
        MatchKind::Pattern
    } else if descriptor.is_wildcard() {
        MatchKind::Wildcard
    } else {
        return None;
    };

    let (matched_host, media_id) = match &captures {
        Some(caps) => extract_host_and_id(caps, host),
        None => (host.to_string(), None),
    };

    Some(Candidate {
        matched: MatchedUrl {
            url: raw.to_string(),
            host: matched_host,
            media_id,
        },
        descriptor,
        kind,
        entry,
    })
}

/// Pulls the plugin's `(host, media_id)` pair out of pattern captures.
///
/// Named groups `host` and `media_id` (or `id`) win. Otherwise one positional
/// group is the media id and two or more are read as host then media id.
fn extract_host_and_id(caps: &Captures<'_>, fallback_host: &str) -> (String, Option<String>) {
    let named_host = caps.name("host").map(|m| m.as_str());
    let named_id = caps
        .name("media_id")
        .or_else(|| caps.name("id"))
        .map(|m| m.as_str());

    let (host, media_id) = if named_host.is_some() || named_id.is_some() {
        (named_host, named_id)
    } else {
        let positional: Vec<&str> = caps.iter().skip(1).flatten().map(|m| m.as_str()).collect();
        match positional.as_slice() {
            [] => (None, None),
            [id] => (None, Some(*id)),
            [host, id, ..] => (Some(*host), Some(*id)),
        }
    };

    let host = host
        .filter(|h| !h.is_empty())
        .map_or_else(|| fallback_host.to_string(), canonical_host);
    let media_id = media_id.filter(|id| !id.is_empty()).map(str::to_string);
    (host, media_id)
}
