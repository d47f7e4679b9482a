//! Shared HTTP client construction for built-in resolvers.
//!
//! Every built-in plugin builds its client here so timeouts, user agent,
//! compression and proxy handling stay the same across plugins. Timeouts are
//! passed in explicitly through [`HttpSettings`] rather than read from
//! process-wide state.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use crate::user_agent;

use super::ResolveError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Network timeouts applied to resolver HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// TCP/TLS connect budget.
    pub connect_timeout: Duration,
    /// Whole-request budget once connected.
    pub read_timeout: Duration,
}

impl HttpSettings {
    /// Creates settings from whole seconds.
    #[must_use]
    pub fn from_secs(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        Self {
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            read_timeout: Duration::from_secs(read_timeout_secs),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self::from_secs(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }
}

/// Builds a resolver HTTP client using shared policy.
///
/// `resolver_name` only appears in errors and logs, never in the User-Agent.
///
/// # Errors
///
/// Returns [`ResolveError::CandidateFailure`] when client construction fails.
pub(crate) fn build_resolver_http_client(
    resolver_name: &str,
    settings: &HttpSettings,
) -> Result<Client, ResolveError> {
    let user_agent = user_agent::default_resolver_user_agent();

    match try_build_client(&user_agent, settings, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // System proxy discovery can panic in sandboxed environments;
            // retry with env proxies only.
            warn!(
                resolver = resolver_name,
                "Resolver client hit system proxy panic; using env-proxy fallback builder"
            );
            try_build_client(&user_agent, settings, true)
                .map_err(|failure| failure.into_resolve_error(resolver_name))
        }
        Err(failure) => Err(failure.into_resolve_error(resolver_name)),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

impl BuildClientFailure {
    fn into_resolve_error(self, resolver_name: &str) -> ResolveError {
        match self {
            Self::Panic => ResolveError::candidate_failed(
                resolver_name,
                "HTTP client construction panicked while initializing resolver networking",
            ),
            Self::Build(error) => ResolveError::candidate_failed(
                resolver_name,
                format!("HTTP client construction failed: {error}"),
            ),
        }
    }
}

fn try_build_client(
    user_agent: &str,
    settings: &HttpSettings,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    let user_agent = user_agent.to_string();
    let settings = *settings;
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(user_agent, &settings);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(user_agent: String, settings: &HttpSettings) -> ClientBuilder {
    Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.read_timeout)
        .user_agent(user_agent)
        .cookie_store(true)
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    for (scheme, names) in [
        ("https", ["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        ("http", ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
    ] {
        let Some(proxy) = first_env_value(&names) else {
            continue;
        };
        let resolved = if scheme == "https" {
            Proxy::https(&proxy)
        } else {
            Proxy::http(&proxy)
        };
        if let Ok(resolved) = resolved {
            builder = builder.proxy(resolved);
        }
    }
    builder
}

fn first_env_value(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_settings_defaults() {
        let settings = HttpSettings::default();
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
        assert_eq!(settings.read_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_build_client_with_custom_settings() {
        let settings = HttpSettings::from_secs(2, 5);
        assert!(build_resolver_http_client("test", &settings).is_ok());
    }

    #[test]
    fn test_build_failure_is_attributed_to_resolver() {
        let error = BuildClientFailure::Panic.into_resolve_error("DirectLink");
        assert!(error.to_string().contains("DirectLink"));
        assert!(error.is_candidate_error());
    }
}
