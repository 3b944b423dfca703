//! Scheduler driving the real HTTP fetcher: failures fall back to synthetic points,
//! recoveries flip the connection state back, and the window grows once per cycle.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::header, http::StatusCode, response::IntoResponse, routing::get, Router};
use memwatch::fetch::Fetcher;
use memwatch::scheduler::{PollPhase, PollSettings, Scheduler};
use url::Url;

const BODY: &str = r#"{
  "success": true,
  "data": {
    "memoryUsage": { "rss": 248168448, "heapUsed": 119239952, "heapTotal": 134086656, "external": 5557201 },
    "process": { "uptime": 35.9 },
    "cpuUsage": { "user": 2884297, "system": 531100 },
    "timestamp": "2025-07-25T17:09:40.634Z"
  }
}"#;

// Fails every other request, starting with the first.
async fn flaky(State(n): State<Arc<AtomicUsize>>) -> axum::response::Response {
    if n.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    } else {
        ([(header::CONTENT_TYPE, "application/json")], BODY).into_response()
    }
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn alternating_failures_each_append_one_point() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/mem-check", get(flaky))
        .with_state(hits.clone());
    let addr = serve(app).await;

    let fetcher = Fetcher::new(Url::parse(&format!("http://{addr}")).unwrap(), None).unwrap();
    let settings = PollSettings {
        interval: Duration::from_millis(50),
        stale_after: Duration::from_millis(40),
    };
    let mut sched = Scheduler::new(Arc::new(fetcher), "/mem-check".into(), settings).with_seed(5);
    let mut rx = sched.subscribe();
    sched.start();

    let first = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.cycles >= 1))
        .await
        .expect("first cycle")
        .unwrap()
        .clone();
    assert_eq!(first.phase, PollPhase::Failed);
    assert!(!first.connection.is_connected);
    assert!(first
        .connection
        .last_error
        .as_deref()
        .unwrap()
        .contains("503"));
    assert_eq!(first.window.len(), 1);

    let second = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.cycles >= 2))
        .await
        .expect("second cycle")
        .unwrap()
        .clone();
    assert_eq!(second.phase, PollPhase::Succeeded);
    assert!(second.connection.is_connected);
    assert_eq!(second.connection.last_error, None);
    assert_eq!(second.window.len(), 2);
    assert_eq!(second.window.latest().unwrap().memory_rss, 237);

    sched.stop().await;
    let after_stop = hits.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(hits.load(Ordering::SeqCst), after_stop);
    let last = sched.snapshot();
    assert_eq!(last.window.len() as u64, last.cycles);
}
