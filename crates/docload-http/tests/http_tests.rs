use docload_host::{Constructor, EventKind, EventTarget, HostError, Listener, ReadyState, Request};
use docload_http::{HttpConfig, HttpRequestConstructor};
use docload_proxies::{BaseUrlRequestProxy, CompletionTrackingProxy, FinishedRequests};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use warp::Filter;

const TEST_PAGE: &str = "<html><head><title>Test page</title></head></html>";

async fn serve_fixtures() -> SocketAddr {
    let page = warp::path!("fixtures" / "test.html").map(|| warp::reply::html(TEST_PAGE));
    let slow = warp::path!("fixtures" / "slow").and_then(|| async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok::<_, warp::Rejection>("late")
    });

    let (addr, server) = warp::serve(page.or(slow)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn requests() -> HttpRequestConstructor {
    HttpRequestConstructor::new(HttpConfig::new().with_timeout_secs(5)).unwrap()
}

fn recording_listener() -> (Listener, Arc<Mutex<Vec<EventKind>>>) {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    let listener: Listener = Arc::new(move |kind| sink.lock().push(kind));
    (listener, fired)
}

async fn finished(proxy: &CompletionTrackingProxy<impl Sized>) -> FinishedRequests {
    tokio::time::timeout(Duration::from_secs(5), proxy.wait_for_requests_to_finish())
        .await
        .expect("requests should finish")
        .unwrap()
}

#[tokio::test]
async fn test_notifies_after_file_has_loaded() {
    let addr = serve_fixtures().await;
    let proxy = CompletionTrackingProxy::new(requests());

    let xhr = proxy.construct().unwrap();
    let (onload, fired) = recording_listener();
    xhr.set_handler(EventKind::Load, Some(onload));
    xhr.open("GET", &format!("http://{addr}/fixtures/test.html")).unwrap();
    xhr.send(None).unwrap();

    let result = finished(&proxy).await;

    assert_eq!(*fired.lock(), vec![EventKind::Load]);
    assert_eq!(result, FinishedRequests { total_count: 1 });
    assert_eq!(xhr.status(), Some(200));
    assert_eq!(xhr.ready_state(), ReadyState::Done);
}

#[tokio::test]
async fn test_loads_relative_to_base_url() {
    let addr = serve_fixtures().await;
    let proxy = CompletionTrackingProxy::new(
        BaseUrlRequestProxy::new(requests(), &format!("http://{addr}/fixtures/")).unwrap(),
    );

    let xhr = proxy.construct().unwrap();
    xhr.open("GET", "test.html").unwrap();
    xhr.send(None).unwrap();
    finished(&proxy).await;

    assert!(xhr.response_text().unwrap().contains("Test page"));
}

#[tokio::test]
async fn test_relative_url_rejected_without_base() {
    let xhr = requests().construct().unwrap();
    let err = xhr.open("GET", "test.html").unwrap_err();
    assert!(matches!(err, HostError::InvalidUrl { .. }));
}

#[tokio::test]
async fn test_error_status_still_loads() {
    let addr = serve_fixtures().await;
    let proxy = CompletionTrackingProxy::new(requests());

    let xhr = proxy.construct().unwrap();
    xhr.open("GET", &format!("http://{addr}/fixtures/missing.html")).unwrap();
    xhr.send(None).unwrap();
    finished(&proxy).await;

    assert_eq!(xhr.status(), Some(404));
}

#[tokio::test]
async fn test_transport_failure_finishes_tracking() {
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let proxy = CompletionTrackingProxy::new(requests());

    let xhr = proxy.construct().unwrap();
    let (onerror, fired) = recording_listener();
    xhr.set_handler(EventKind::Error, Some(onerror));
    xhr.open("GET", &format!("http://{closed}/unreachable")).unwrap();
    xhr.send(None).unwrap();

    assert_eq!(finished(&proxy).await.total_count, 1);
    assert_eq!(*fired.lock(), vec![EventKind::Error]);
    assert!(xhr.get_ref().error().is_some());
}

#[tokio::test]
async fn test_abort_finishes_tracking_once() {
    let addr = serve_fixtures().await;
    let proxy = CompletionTrackingProxy::new(requests());

    let xhr = proxy.construct().unwrap();
    let (listener, fired) = recording_listener();
    for kind in EventKind::TERMINAL {
        xhr.add_event_listener(kind, Arc::clone(&listener)).unwrap();
    }
    xhr.open("GET", &format!("http://{addr}/fixtures/slow")).unwrap();
    xhr.send(None).unwrap();
    assert_eq!(proxy.pending(), 1);

    xhr.abort();
    xhr.abort();

    assert_eq!(finished(&proxy).await.total_count, 1);
    assert_eq!(*fired.lock(), vec![EventKind::Abort]);
}
