//! Generic embed-page resolver.
//!
//! [`GenericEmbedResolver`] claims URLs that look like player or embed pages
//! on any host (`/embed/`, `/watch?v=`, `/video/`, `/stream/`, `/play/`),
//! fetches the page, and pulls `.mp4` stream links out of common player
//! markup: quoted absolute URLs and `file`/`url`/`src` JSON keys.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use super::http_client::{HttpSettings, build_resolver_http_client};
use super::utils::{absolutize_url, compile_static_regex, has_video_extension};
use super::{MatchedUrl, ResolveContext, ResolveError, ResolvedUrl, Resolver, ResolverDescriptor};

const NAME: &str = "GenericEmbed";
const PRIORITY: i32 = 150;
const EMBED_PATTERN: &str = r"/embed/|/watch\?v=|/video/|/stream/|/play/";

static ABSOLUTE_MP4_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?i)["'](https?://[^"'\s]+?\.mp4[^"'\s]*)["']"#)
});
static PLAYER_KEY_MP4_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?i)["'](?:file|url|src)["']\s*:\s*["']([^"']+?\.mp4[^"']*)["']"#)
});

/// Scrapes direct `.mp4` links from generic embed pages.
pub struct GenericEmbedResolver {
    client: Client,
}

impl GenericEmbedResolver {
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

impl std::fmt::Debug for GenericEmbedResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericEmbedResolver").finish_non_exhaustive()
    }
}

#[async_trait]
impl Resolver for GenericEmbedResolver {
    fn descriptor(&self) -> ResolverDescriptor {
        let descriptor = ResolverDescriptor::new(NAME).with_priority(PRIORITY);
        match descriptor.clone().with_pattern(EMBED_PATTERN) {
            Ok(with_pattern) => with_pattern,
            // Constant pattern; an empty claim set keeps the plugin inert.
            Err(_) => descriptor,
        }
    }

    #[tracing::instrument(skip(self, matched, ctx), fields(resolver = NAME, url = %matched.url))]
    async fn resolve(
        &self,
        matched: &MatchedUrl,
        ctx: &ResolveContext,
    ) -> Result<ResolvedUrl, ResolveError> {
        let page_url = Url::parse(&matched.url)
            .map_err(|e| ResolveError::candidate_failed(NAME, format!("URL could not be parsed: {e}")))?;

        if has_video_extension(&page_url) {
            return Err(ResolveError::candidate_failed(
                NAME,
                "URL is already a media file, not an embed page",
            ));
        }

        let response = self
            .client
            .get(page_url.as_str())
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| ResolveError::candidate_failed(NAME, format!("page request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ResolveError::candidate_failed(
                NAME,
                format!("embed page returned HTTP {}", response.status().as_u16()),
            ));
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| {
            ResolveError::candidate_failed(NAME, format!("embed page could not be read: {e}"))
        })?;

        let streams = extract_streams(&html, &final_url);
        debug!(streams = streams.len(), "Scanned embed page");

        let chosen = match streams.as_slice() {
            [] => {
                return Err(ResolveError::candidate_failed(
                    NAME,
                    "no .mp4 stream found in embed page",
                ));
            }
            [only] => only.clone(),
            [first, ..] if ctx.auto_pick => first.clone(),
            many => {
                return Err(ResolveError::candidate_failed(
                    NAME,
                    format!(
                        "embed page offers {} streams and auto_pick is off",
                        many.len()
                    ),
                ));
            }
        };

        let mut metadata = HashMap::new();
        metadata.insert("source_page".to_string(), final_url.to_string());
        metadata.insert("streams_found".to_string(), streams.len().to_string());
        Ok(ResolvedUrl::with_metadata(chosen, metadata))
    }
}

/// Returns distinct `.mp4` links in page order of discovery.
fn extract_streams(html: &str, base_url: &Url) -> Vec<String> {
    let absolute = ABSOLUTE_MP4_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().replace("\\/", "/"));
    let keyed = PLAYER_KEY_MP4_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| absolutize_url(&m.as_str().replace("\\/", "/"), base_url));

    let mut streams: Vec<String> = Vec::new();
    for link in absolute.chain(keyed) {
        if link.starts_with("http") && !streams.contains(&link) {
            streams.push(link);
        }
    }
    streams
}
