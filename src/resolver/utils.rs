//! Shared utilities for resolver modules: host normalization, domain claims, and media checks.

use regex::Regex;
use url::Url;

/// File extensions treated as directly playable media.
pub const VIDEO_EXTENSIONS: [&str; 8] = [
    ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v",
];

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Normalizes a host string: trim, strip leading "www.", trailing '.', and lowercases.
#[must_use]
pub fn canonical_host(host: &str) -> String {
    let lowered = host.trim().trim_end_matches('.').to_ascii_lowercase();
    match lowered.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => lowered,
    }
}

/// Returns true if `host` equals `domain` or is a subdomain of it.
///
/// Both sides are normalized with [`canonical_host`] first, so
/// `m.YouTube.com` matches `youtube.com` but `notyoutube.com` does not.
#[must_use]
pub fn host_matches_domain(host: &str, domain: &str) -> bool {
    let host = canonical_host(host);
    let domain = canonical_host(domain);
    if domain.is_empty() {
        return false;
    }
    host == domain
        || host
            .strip_suffix(domain.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Returns true if the URL path ends with a known video extension.
#[must_use]
pub fn has_video_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Resolves a possibly relative URL string against a base URL.
///
/// Returns the value as-is if it already starts with `http://` or `https://`;
/// normalizes `//...` to `https:...`; otherwise joins with `base_url`.
#[must_use]
pub fn absolutize_url(value: &str, base_url: &Url) -> Option<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if value.starts_with("//") {
        return Some(format!("https:{value}"));
    }
    base_url.join(value).ok().map(|url| url.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_host_strips_www_and_case() {
        assert_eq!(canonical_host("WWW.YouTube.com"), "youtube.com");
        assert_eq!(canonical_host(" example.org. "), "example.org");
        assert_eq!(canonical_host("wwwx.example.org"), "wwwx.example.org");
    }

    #[test]
    fn test_host_matches_domain_exact_and_subdomain() {
        assert!(host_matches_domain("youtube.com", "youtube.com"));
        assert!(host_matches_domain("www.youtube.com", "youtube.com"));
        assert!(host_matches_domain("m.youtube.com", "youtube.com"));
        assert!(!host_matches_domain("notyoutube.com", "youtube.com"));
        assert!(!host_matches_domain("youtube.com", "m.youtube.com"));
        assert!(!host_matches_domain("youtube.com", ""));
    }

    #[test]
    fn test_has_video_extension_ignores_query() {
        let url = Url::parse("https://cdn.example.com/a/clip.MP4?token=1").unwrap();
        assert!(has_video_extension(&url));

        let url = Url::parse("https://example.com/watch?file=clip.mp4").unwrap();
        assert!(!has_video_extension(&url));
    }

    #[test]
    fn test_absolutize_url_variants() {
        let base = Url::parse("https://host.example/embed/abc").unwrap();
        assert_eq!(
            absolutize_url("https://cdn.example/v.mp4", &base).unwrap(),
            "https://cdn.example/v.mp4"
        );
        assert_eq!(
            absolutize_url("//cdn.example/v.mp4", &base).unwrap(),
            "https://cdn.example/v.mp4"
        );
        assert_eq!(
            absolutize_url("/files/v.mp4", &base).unwrap(),
            "https://host.example/files/v.mp4"
        );
    }
}
