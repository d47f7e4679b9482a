//! Integration tests for the built-in plugins against a mock media host.

mod support;

use std::sync::Arc;

use resolveurl_core::resolver::{
    DirectLinkResolver, DispatchOptions, Dispatcher, GenericEmbedResolver, HttpSettings,
    MatchedUrl, ResolveContext, Resolver, build_default_resolver_registry,
};
use support::socket_guard::start_mock_server_or_skip;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn matched(url: &str) -> MatchedUrl {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();
    MatchedUrl {
        url: url.to_string(),
        host,
        media_id: None,
    }
}

fn no_auto_pick() -> ResolveContext {
    ResolveContext { auto_pick: false }
}

#[tokio::test]
async fn test_direct_link_accepts_video_content() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("HEAD"))
        .and(path("/media/clip.mp4"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .insert_header("content-length", "1048576"),
        )
        .mount(&server)
        .await;

    let resolver = DirectLinkResolver::new(&HttpSettings::default()).unwrap();
    let url = format!("{}/media/clip.mp4", server.uri());
    let resolved = resolver
        .resolve(&matched(&url), &ResolveContext::default())
        .await
        .unwrap();

    assert_eq!(resolved.url, url);
    assert_eq!(
        resolved.metadata.get("content_type").map(String::as_str),
        Some("video/mp4")
    );
}

#[tokio::test]
async fn test_direct_link_rejects_missing_file() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("HEAD"))
        .and(path("/gone.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resolver = DirectLinkResolver::new(&HttpSettings::default()).unwrap();
    let error = resolver
        .resolve(
            &matched(&format!("{}/gone.mp4", server.uri())),
            &ResolveContext::default(),
        )
        .await
        .unwrap_err();
    assert!(error.to_string().contains("HTTP 404"), "{error}");
}

#[tokio::test]
async fn test_direct_link_query_extension_needs_video_content_type() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("HEAD"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;

    let resolver = DirectLinkResolver::new(&HttpSettings::default()).unwrap();
    let error = resolver
        .resolve(
            &matched(&format!("{}/download?file=clip.mp4", server.uri())),
            &ResolveContext::default(),
        )
        .await
        .unwrap_err();
    assert!(error.to_string().contains("not a video"), "{error}");
}

#[tokio::test]
async fn test_generic_embed_extracts_single_stream() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/embed/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><script>player.setup({"file": "/videos/42.mp4"});</script></html>"#,
        ))
        .mount(&server)
        .await;

    let resolver = GenericEmbedResolver::new(&HttpSettings::default()).unwrap();
    let page = format!("{}/embed/42", server.uri());
    let resolved = resolver
        .resolve(&matched(&page), &ResolveContext::default())
        .await
        .unwrap();

    assert_eq!(resolved.url, format!("{}/videos/42.mp4", server.uri()));
    assert_eq!(
        resolved.metadata.get("streams_found").map(String::as_str),
        Some("1")
    );
}

#[tokio::test]
async fn test_generic_embed_multiple_streams_respects_auto_pick() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/embed/multi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<video>
                 <source src="https://cdn.example.com/720.mp4">
                 <source src="https://cdn.example.com/480.mp4">
               </video>"#,
        ))
        .mount(&server)
        .await;

    let resolver = GenericEmbedResolver::new(&HttpSettings::default()).unwrap();
    let page = format!("{}/embed/multi", server.uri());

    let picked = resolver
        .resolve(&matched(&page), &ResolveContext::default())
        .await
        .unwrap();
    assert_eq!(picked.url, "https://cdn.example.com/720.mp4");

    let error = resolver
        .resolve(&matched(&page), &no_auto_pick())
        .await
        .unwrap_err();
    assert!(error.to_string().contains("2 streams"), "{error}");
}

#[tokio::test]
async fn test_generic_embed_page_without_streams_fails() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/embed/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nothing here</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/embed/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let resolver = GenericEmbedResolver::new(&HttpSettings::default()).unwrap();

    let error = resolver
        .resolve(
            &matched(&format!("{}/embed/empty", server.uri())),
            &ResolveContext::default(),
        )
        .await
        .unwrap_err();
    assert!(error.to_string().contains("no .mp4 stream"), "{error}");

    let error = resolver
        .resolve(
            &matched(&format!("{}/embed/broken", server.uri())),
            &ResolveContext::default(),
        )
        .await
        .unwrap_err();
    assert!(error.to_string().contains("HTTP 500"), "{error}");
}

#[tokio::test]
async fn test_default_registry_falls_back_from_embed_to_direct_link() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    // Embed page path with a media extension: GenericEmbed declines, DirectLink confirms.
    Mock::given(method("HEAD"))
        .and(path("/video/clip.mp4"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "video/mp4"))
        .mount(&server)
        .await;

    let registry = Arc::new(build_default_resolver_registry(&HttpSettings::default()));
    let dispatcher = Dispatcher::new(registry, DispatchOptions::default());
    let url = format!("{}/video/clip.mp4", server.uri());
    let outcome = dispatcher.resolve(&url).await;

    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(outcome.resolver_used.as_deref(), Some("DirectLink"));
    assert_eq!(outcome.attempts.len(), 2);
    assert_eq!(outcome.attempts[0].resolver, "GenericEmbed");
}
