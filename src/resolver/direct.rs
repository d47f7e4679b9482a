//! Direct link resolver for URLs that already point at a media file.
//!
//! [`DirectLinkResolver`] claims every host at the lowest built-in priority,
//! so it only runs after site-specific plugins. It accepts URLs that mention a
//! video extension and confirms them with a `HEAD` request before handing the
//! URL back unchanged.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use url::Url;

use super::http_client::{HttpSettings, build_resolver_http_client};
use super::utils::{VIDEO_EXTENSIONS, has_video_extension};
use super::{MatchedUrl, ResolveContext, ResolveError, ResolvedUrl, Resolver, ResolverDescriptor};

const NAME: &str = "DirectLink";
const PRIORITY: i32 = 200;

/// Passthrough resolver for direct video file URLs.
pub struct DirectLinkResolver {
    client: Client,
}

impl DirectLinkResolver {
    /// Creates the resolver with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when HTTP client construction fails.
    pub fn new(settings: &HttpSettings) -> Result<Self, ResolveError> {
        Ok(Self {
            client: build_resolver_http_client(NAME, settings)?,
        })
    }
}

impl std::fmt::Debug for DirectLinkResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectLinkResolver").finish_non_exhaustive()
    }
}

#[async_trait]
impl Resolver for DirectLinkResolver {
    fn descriptor(&self) -> ResolverDescriptor {
        ResolverDescriptor::new(NAME)
            .with_domains(["*"])
            .with_priority(PRIORITY)
    }

    #[tracing::instrument(skip(self, matched, _ctx), fields(resolver = NAME, url = %matched.url))]
    async fn resolve(
        &self,
        matched: &MatchedUrl,
        _ctx: &ResolveContext,
    ) -> Result<ResolvedUrl, ResolveError> {
        let url = Url::parse(&matched.url)
            .map_err(|e| ResolveError::candidate_failed(NAME, format!("URL could not be parsed: {e}")))?;

        if !mentions_video_extension(&url) {
            return Err(ResolveError::candidate_failed(
                NAME,
                "URL does not reference a known video file type",
            ));
        }

        let response = self.client.head(url.as_str()).send().await.map_err(|e| {
            ResolveError::candidate_failed(NAME, format!("HEAD request failed: {e}"))
        })?;

        if response.status() != StatusCode::OK {
            return Err(ResolveError::candidate_failed(
                NAME,
                format!("media host returned HTTP {}", response.status().as_u16()),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if !content_type.starts_with("video/") && !has_video_extension(&url) {
            return Err(ResolveError::candidate_failed(
                NAME,
                format!("response is not a video (content-type '{content_type}')"),
            ));
        }

        let mut metadata = HashMap::new();
        if !content_type.is_empty() {
            metadata.insert("content_type".to_string(), content_type);
        }
        if let Some(length) = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
        {
            metadata.insert("content_length".to_string(), length.to_string());
        }

        Ok(ResolvedUrl::with_metadata(url.as_str(), metadata))
    }
}

/// Returns true if the path or query names a video file.
fn mentions_video_extension(url: &Url) -> bool {
    if has_video_extension(url) {
        return true;
    }
    url.query().is_some_and(|query| {
        let query = query.to_ascii_lowercase();
        VIDEO_EXTENSIONS.iter().any(|ext| query.contains(ext))
    })
}
