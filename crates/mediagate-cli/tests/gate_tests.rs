use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use mediagate_cli::{routes, AppState, CorpPolicy, GatewayConfig};
use mediagate_store::{
    GetOptions, HttpMetadata, MemoryObjectStore, ObjectStore, StoreError, StoredObject,
};
use rstest::rstest;
use std::sync::Arc;
use tower::ServiceExt;

const SIZE: usize = 100;

fn config() -> GatewayConfig {
    GatewayConfig {
        allowed_hosts: vec!["blog.example.com".to_string(), "eo-oss.example.com".to_string()],
        ..Default::default()
    }
}

fn app_with_store(config: GatewayConfig, store: Arc<dyn ObjectStore>) -> Router {
    routes::create_router(Arc::new(AppState::with_store(config, store)))
}

fn app() -> Router {
    let store = MemoryObjectStore::new();
    let data: Vec<u8> = (0..SIZE as u8).collect();
    store.put("clip.mp4", data, HttpMetadata::with_content_type("video/mp4"));
    store.put("中", "unicode key", HttpMetadata::with_content_type("text/plain"));
    store.put(
        "videos/a b.webm",
        vec![9u8; 16],
        HttpMetadata {
            content_type: Some("video/webm".to_string()),
            cache_control: Some("public, max-age=86400".to_string()),
            ..Default::default()
        },
    );
    app_with_store(config(), Arc::new(store))
}

fn request(method: Method, uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (Response, Vec<u8>) {
    let response = app.oneshot(req).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap().to_vec();
    (Response::from_parts(parts, Body::empty()), bytes)
}

fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Object store whose backend is always down
struct FailingStore;

#[async_trait]
impl ObjectStore for FailingStore {
    async fn get(&self, _key: &str, _options: GetOptions) -> mediagate_store::Result<Option<StoredObject>> {
        Err(StoreError::Connection("bucket unreachable".to_string()))
    }
}

#[rstest]
#[case(&[])]
#[case(&[("referer", "https://blog.example.com/post/1")])]
#[case(&[("referer", "https://evil.example.net/"), ("user-agent", "Mozilla/5.0 Obsidian/1.4.16")])]
#[case(&[("referer", "https://eo-oss.example.com/x"), ("range", "garbage")])]
#[tokio::test]
async fn test_authorized_requests_pass(#[case] headers: &[(&str, &str)]) {
    let (response, _) = send(app(), request(Method::GET, "/clip.mp4", headers)).await;
    assert!(response.status().is_success(), "status {}", response.status());
}

#[rstest]
#[case(Method::GET)]
#[case(Method::HEAD)]
#[case(Method::OPTIONS)]
#[case(Method::POST)]
#[tokio::test]
async fn test_disallowed_referer_blocked(#[case] method: Method) {
    let headers = [
        ("referer", "https://evil.example.net/page"),
        ("user-agent", "Mozilla/5.0"),
    ];
    let (response, body) = send(app(), request(method.clone(), "/clip.mp4", &headers)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    if method != Method::HEAD {
        assert_eq!(body, b"blocked");
    }
}

#[tokio::test]
async fn test_malformed_referer_blocked() {
    let headers = [("referer", "not a url")];
    let (response, body) = send(app(), request(Method::GET, "/clip.mp4", &headers)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body, b"blocked");
}

#[tokio::test]
async fn test_preflight_echoes_origin() {
    let headers = [("referer", "https://blog.example.com/post/1")];
    let (response, body) = send(app(), request(Method::OPTIONS, "/clip.mp4", &headers)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body.is_empty());
    assert_eq!(
        header_str(&response, "access-control-allow-origin"),
        Some("https://blog.example.com")
    );
    assert_eq!(
        header_str(&response, "access-control-allow-methods"),
        Some("GET, HEAD, OPTIONS")
    );
    assert_eq!(header_str(&response, "access-control-allow-headers"), Some("Range"));
    assert_eq!(header_str(&response, "access-control-max-age"), Some("86400"));
}

#[tokio::test]
async fn test_preflight_without_referer_is_wildcard() {
    let (response, _) = send(app(), request(Method::OPTIONS, "/anything", &[])).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(header_str(&response, "access-control-allow-origin"), Some("*"));
}

#[tokio::test]
async fn test_percent_decoded_key() {
    let (response, body) = send(app(), request(Method::GET, "/%E4%B8%AD", &[])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body, b"unicode key");

    let (response, body) = send(app(), request(Method::GET, "/videos/a%20b.webm", &[])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body.len(), 16);
    assert_eq!(
        header_str(&response, "cache-control"),
        Some("public, max-age=86400")
    );
}

#[tokio::test]
async fn test_bounded_range() {
    let headers = [
        ("referer", "https://blog.example.com/watch"),
        ("range", "bytes=10-19"),
    ];
    let (response, body) = send(app(), request(Method::GET, "/clip.mp4", &headers)).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, "content-range"), Some("bytes 10-19/100"));
    assert_eq!(header_str(&response, "accept-ranges"), Some("bytes"));
    assert_eq!(header_str(&response, "content-length"), Some("10"));
    assert_eq!(body, (10..20u8).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_open_ended_range() {
    let headers = [("range", "bytes=10-")];
    let (response, body) = send(app(), request(Method::GET, "/clip.mp4", &headers)).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, "content-range"), Some("bytes 10-99/100"));
    assert_eq!(body.len(), SIZE - 10);
}

#[tokio::test]
async fn test_range_past_end_is_clamped() {
    let headers = [("range", "bytes=5-1000")];
    let (response, body) = send(app(), request(Method::GET, "/clip.mp4", &headers)).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, "content-range"), Some("bytes 5-99/100"));
    assert_eq!(body.len(), 95);
}

#[tokio::test]
async fn test_range_beyond_size_unsatisfiable() {
    let headers = [("range", "bytes=100-")];
    let (response, body) = send(app(), request(Method::GET, "/clip.mp4", &headers)).await;

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(header_str(&response, "content-range"), Some("bytes */100"));
    assert_eq!(body, b"range not satisfiable");
}

#[rstest]
#[case(None)]
#[case(Some("bytes=-20"))]
#[case(Some("bytes=30-10"))]
#[case(Some("bytes=0-1,4-5"))]
#[case(Some("lines=1-2"))]
#[tokio::test]
async fn test_missing_or_malformed_range_serves_full(#[case] range: Option<&str>) {
    let headers: Vec<(&str, &str)> =
        range.map(|r| ("range", r)).into_iter().collect();
    let (response, body) = send(app(), request(Method::GET, "/clip.mp4", &headers)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body.len(), SIZE);
    assert!(response.headers().get("content-range").is_none());
    assert!(response.headers().get("accept-ranges").is_none());
}

#[tokio::test]
async fn test_cors_and_corp_headers() {
    let headers = [("referer", "https://blog.example.com/post")];
    let (response, _) = send(app(), request(Method::GET, "/clip.mp4", &headers)).await;

    assert_eq!(header_str(&response, "content-type"), Some("video/mp4"));
    assert_eq!(
        header_str(&response, "access-control-allow-origin"),
        Some("https://blog.example.com")
    );
    assert_eq!(header_str(&response, "vary"), Some("Origin"));
    assert_eq!(
        header_str(&response, "access-control-expose-headers"),
        Some("Content-Length, Content-Range, Accept-Ranges")
    );
    assert_eq!(header_str(&response, "cross-origin-resource-policy"), Some("same-site"));
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn test_configured_corp_policy() {
    let store = MemoryObjectStore::new();
    store.put("a.png", vec![0u8; 4], HttpMetadata::default());
    let config = GatewayConfig {
        corp: CorpPolicy::CrossOrigin,
        ..config()
    };
    let app = app_with_store(config, Arc::new(store));

    let (response, _) = send(app, request(Method::GET, "/a.png", &[])).await;
    assert_eq!(header_str(&response, "cross-origin-resource-policy"), Some("cross-origin"));
    assert_eq!(header_str(&response, "access-control-allow-origin"), Some("*"));
}

#[tokio::test]
async fn test_head_range_has_headers_only() {
    let headers = [("range", "bytes=0-9")];
    let (response, body) = send(app(), request(Method::HEAD, "/clip.mp4", &headers)).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, "content-range"), Some("bytes 0-9/100"));
    assert_eq!(header_str(&response, "content-length"), Some("10"));
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_missing_key_is_404() {
    let (response, body) = send(app(), request(Method::GET, "/nope.mp4", &[])).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body, b"404");
}

#[rstest]
#[case("/")]
#[case("/%FF")]
#[tokio::test]
async fn test_bad_key_is_400(#[case] uri: &str) {
    let (response, body) = send(app(), request(Method::GET, uri, &[])).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body, b"bad request");
}

#[tokio::test]
async fn test_unsupported_method() {
    let (response, body) = send(app(), request(Method::DELETE, "/clip.mp4", &[])).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(header_str(&response, "allow"), Some("GET, HEAD, OPTIONS"));
    assert_eq!(body, b"method not allowed");
}

#[tokio::test]
async fn test_store_failure_is_bad_gateway() {
    let app = app_with_store(config(), Arc::new(FailingStore));
    let (response, body) = send(app, request(Method::GET, "/clip.mp4", &[])).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body, b"bad gateway");
}
