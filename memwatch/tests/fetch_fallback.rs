//! Fetcher behaviour against in-process HTTP servers: direct success, relay fallback on
//! transport failure, and no relay for status/content-type failures.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    routing::get,
    Router,
};
use memwatch::fetch::{FetchError, Fetcher, SampleSource};
use url::Url;

const BODY: &str = r#"{
  "success": true,
  "data": {
    "memoryUsage": {
      "rss": 248168448, "rssFormatted": "237 MB",
      "heapUsed": 119239952, "heapUsedFormatted": "114 MB",
      "heapTotal": 134086656, "heapTotalFormatted": "128 MB",
      "external": 5557201, "externalFormatted": "5 MB",
      "arrayBuffers": 1945007, "arrayBuffersFormatted": "2 MB"
    },
    "process": {
      "pid": 93996, "ppid": 93922, "platform": "darwin", "arch": "arm64",
      "nodeVersion": "v22.14.0", "uptime": 35.971356125, "uptimeFormatted": "36 seconds"
    },
    "cpuUsage": { "user": 2884297, "system": 531100 },
    "environment": { "timezone": "America/Chicago", "locale": "en-US" },
    "hrtime": "611104358808250",
    "timestamp": "2025-07-25T17:09:40.634Z"
  },
  "meta": { "requestDuration": "0.42ms", "endpoint": "/mem-check" }
}"#;

type Hits = Arc<Mutex<Vec<Option<String>>>>;

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

// A port nothing listens on
fn closed_port() -> u16 {
    let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    l.local_addr().unwrap().port()
}

async fn json_ok() -> impl axum::response::IntoResponse {
    ([(header::CONTENT_TYPE, "application/json; charset=utf-8")], BODY)
}

async fn relay(State(hits): State<Hits>, RawQuery(q): RawQuery) -> impl axum::response::IntoResponse {
    hits.lock().unwrap().push(q);
    ([(header::CONTENT_TYPE, "application/json")], BODY)
}

/// Endpoint server with a few behaviours plus a relay that records raw query strings.
async fn fixture() -> (SocketAddr, Hits) {
    let hits: Hits = Arc::default();
    let app = Router::new()
        .route("/mem-check", get(json_ok))
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/html",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html></html>") }),
        )
        .route(
            "/garbage",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{\"success\":") }),
        )
        .route("/raw", get(relay))
        .route(
            "/relay-500",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .with_state(hits.clone());
    (serve(app).await, hits)
}

fn fetcher(base: &str, proxy: Option<String>) -> Fetcher {
    Fetcher::new(Url::parse(base).unwrap(), proxy).unwrap()
}

#[tokio::test]
async fn direct_success_does_not_touch_relay() {
    let (addr, hits) = fixture().await;
    let f = fetcher(&format!("http://{addr}"), Some(format!("http://{addr}/raw?url=")));
    let r = f.fetch("/mem-check").await.expect("direct fetch");
    assert_eq!(r.data.memory_usage.rss, 248168448.0);
    assert_eq!(r.data.environment.timezone, "America/Chicago");
    assert_eq!(r.meta.request_duration, "0.42ms");
    assert!(hits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn transport_failure_retries_once_through_relay() {
    let (addr, hits) = fixture().await;
    let port = closed_port();
    let f = fetcher(&format!("http://127.0.0.1:{port}"), Some(format!("http://{addr}/raw?url=")));

    let r = f.fetch("/mem-check").await.expect("relay fetch");
    assert_eq!(r.data.memory_usage.rss, 248168448.0);

    let seen = hits.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![Some(format!("url=http%3A%2F%2F127.0.0.1%3A{port}%2Fmem-check"))]
    );
}

#[tokio::test]
async fn http_500_is_reported_without_relay() {
    let (addr, hits) = fixture().await;
    let f = fetcher(&format!("http://{addr}"), Some(format!("http://{addr}/raw?url=")));
    match f.fetch("/broken").await {
        Err(FetchError::HttpStatus { status }) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert!(hits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_json_content_type_is_reported_without_relay() {
    let (addr, hits) = fixture().await;
    let f = fetcher(&format!("http://{addr}"), Some(format!("http://{addr}/raw?url=")));
    match f.fetch("/html").await {
        Err(FetchError::ContentType { content_type }) => {
            assert_eq!(content_type.as_deref(), Some("text/html"))
        }
        other => panic!("expected ContentType, got {other:?}"),
    }
    assert!(hits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (addr, _hits) = fixture().await;
    let f = fetcher(&format!("http://{addr}"), None);
    assert!(matches!(f.fetch("/garbage").await, Err(FetchError::Decode(_))));
}

#[tokio::test]
async fn relay_failure_is_proxy_transport_error() {
    let direct = closed_port();
    let relay = closed_port();
    let f = fetcher(
        &format!("http://127.0.0.1:{direct}"),
        Some(format!("http://127.0.0.1:{relay}/raw?url=")),
    );
    assert!(matches!(
        f.fetch("/mem-check").await,
        Err(FetchError::ProxyTransport { .. })
    ));
}

#[tokio::test]
async fn relay_status_errors_are_checked_like_direct_ones() {
    let (addr, _hits) = fixture().await;
    let port = closed_port();
    let f = fetcher(
        &format!("http://127.0.0.1:{port}"),
        Some(format!("http://{addr}/relay-500?url=")),
    );
    assert!(matches!(
        f.fetch("/mem-check").await,
        Err(FetchError::HttpStatus { .. })
    ));
}

#[tokio::test]
async fn disabled_relay_surfaces_transport_error() {
    let port = closed_port();
    let f = fetcher(&format!("http://127.0.0.1:{port}"), None);
    assert!(matches!(
        f.fetch("/mem-check").await,
        Err(FetchError::Transport { .. })
    ));
}

#[tokio::test]
async fn absolute_endpoint_ignores_base_url() {
    let (addr, _hits) = fixture().await;
    let f = fetcher(&format!("http://127.0.0.1:{}", closed_port()), None);
    let r = f
        .fetch(&format!("http://{addr}/mem-check"))
        .await
        .expect("absolute endpoint");
    assert!(r.success);
}
