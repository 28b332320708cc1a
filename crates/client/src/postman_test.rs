use std::io::Read;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use flate2::read::GzDecoder;
use opentsdb_protocol::{DataPoint, Tags};

use super::*;
use crate::error::PostError;

fn sample_batch() -> Vec<DataPoint> {
    let tags1: Tags = [("key_z", "val1"), ("key_a", "val2")].into_iter().collect();
    let tags2: Tags = [("type", "test")].into_iter().collect();
    vec![
        DataPoint::new("test1", 123, 1i64, tags1),
        DataPoint::new("test2", 234, 2i64, tags2),
    ]
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(String, String, String)>>>,
}

async fn capture_204(
    State(captured): State<Captured>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let mut text = String::new();
    GzDecoder::new(&body[..]).read_to_string(&mut text).unwrap();

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    captured.requests.lock().unwrap().push((
        header("content-type"),
        header("content-encoding"),
        text,
    ));
    StatusCode::NO_CONTENT
}

#[tokio::test]
async fn test_post_success() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/put", post(capture_204))
        .with_state(captured.clone());
    let addr = spawn(app).await;

    let mut postman = Postman::new(Duration::from_secs(5));
    postman
        .post(&sample_batch(), &format!("http://{addr}/api/put"))
        .await
        .unwrap();

    let requests = captured.requests.lock().unwrap();
    let (content_type, content_encoding, body) = &requests[0];
    assert_eq!(content_type, "application/json");
    assert_eq!(content_encoding, "gzip");
    assert_eq!(
        body,
        concat!(
            r#"[{"metric":"test1","timestamp":123,"value":1,"tags":{"key_a":"val2","key_z":"val1"}},"#,
            r#"{"metric":"test2","timestamp":234,"value":2,"tags":{"type":"test"}}]"#,
            "\n"
        )
    );
}

#[tokio::test]
async fn test_post_scratch_buffer_survives_requests() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/put", post(capture_204))
        .with_state(captured.clone());
    let addr = spawn(app).await;
    let url = format!("http://{addr}/api/put");

    let mut postman = Postman::new(Duration::from_secs(5));
    postman.post(&sample_batch(), &url).await.unwrap();
    postman.post(&sample_batch(), &url).await.unwrap();

    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].2, requests[1].2);
}

#[tokio::test]
async fn test_post_bad_status_carries_body() {
    let app = Router::new().route(
        "/api/put",
        post(|| async { (StatusCode::NOT_FOUND, "Nothing here, move along") }),
    );
    let addr = spawn(app).await;

    let mut postman = Postman::new(Duration::from_secs(5));
    let err = postman
        .post(&sample_batch(), &format!("http://{addr}/api/put"))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        r#"unexpected status 404 ("Nothing here, move along")"#
    );
    assert!(matches!(err, PostError::BadStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_post_timeout() {
    let app = Router::new().route(
        "/api/put",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            StatusCode::NO_CONTENT
        }),
    );
    let addr = spawn(app).await;

    let mut postman = Postman::new(Duration::from_millis(20));
    let err = postman
        .post(&sample_batch(), &format!("http://{addr}/api/put"))
        .await
        .unwrap_err();

    match err {
        PostError::Transport(e) => assert!(e.is_timeout()),
        other => panic!("expected transport error, got {other}"),
    }
}

#[tokio::test]
async fn test_post_connection_refused() {
    let mut postman = Postman::new(Duration::from_secs(1));
    // Port 1 is never listening locally.
    let err = postman
        .post(&sample_batch(), "http://127.0.0.1:1/api/put")
        .await
        .unwrap_err();

    assert!(matches!(err, PostError::Transport(_)));
}
