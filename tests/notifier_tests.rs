//! Integration tests for the notifier flow
//!
//! Each test starts a mock media server on an ephemeral port and drives
//! [run] or the client against it.

use std::collections::HashMap;
use std::ffi::OsString;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::{get, post};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;

use mediaserver_notify::services::MediaServerClient;
use mediaserver_notify::{Config, ExitStatus, config, run};

const API_KEY: &str = "API_KEY";
const EXPECTED_AUTH: &str = r#"MediaBrowser Client="NZBGet", Token="API_KEY""#;
const PONG: &str = r#"{"data":{"pid":5124},"message":"Pong","result":"success"}"#;

// ============================================================================
// Helpers
// ============================================================================

async fn spawn_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// An address nothing listens on
async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

fn config_for(addr: SocketAddr, extra: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, OsString> = HashMap::from([
        (config::API_KEY.to_string(), API_KEY.into()),
        (config::HOST.to_string(), addr.ip().to_string().into()),
        (config::PORT.to_string(), addr.port().to_string().into()),
        (config::VERBOSE.to_string(), "yes".into()),
        (config::TIMEOUT.to_string(), "5".into()),
    ]);
    for (key, value) in extra {
        env.insert(key.to_string(), value.into());
    }
    Config::from_lookup(|key| env.get(key).cloned()).unwrap()
}

fn ping_config(addr: SocketAddr) -> Config {
    config_for(addr, &[(config::COMMAND, "ping")])
}

fn refresh_env() -> Vec<(&'static str, &'static str)> {
    vec![(config::DIRECTORY, "/downloads/intermediate/Show.S01E01")]
}

#[derive(Clone, Default)]
struct Recorded(Arc<Mutex<Vec<Option<String>>>>);

impl Recorded {
    fn push(&self, headers: &HeaderMap) {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.0.lock().unwrap().push(auth);
    }

    fn calls(&self) -> Vec<Option<String>> {
        self.0.lock().unwrap().clone()
    }
}

async fn ping_handler(State(recorded): State<Recorded>, headers: HeaderMap) -> &'static str {
    recorded.push(&headers);
    "success"
}

async fn refresh_handler(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
) -> (StatusCode, &'static str) {
    recorded.push(&headers);
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == EXPECTED_AUTH);

    if authorized {
        (StatusCode::OK, "success")
    } else {
        (StatusCode::UNAUTHORIZED, "unauthorized")
    }
}

fn media_server(recorded: Recorded) -> Router {
    Router::new()
        .route("/System/Ping", get(ping_handler))
        .route("/Library/Refresh", post(refresh_handler))
        .with_state(recorded)
}

// ============================================================================
// Ping mode
// ============================================================================

#[tokio::test]
async fn test_ping_success() {
    let recorded = Recorded::default();
    let addr = spawn_server(media_server(recorded.clone())).await;

    let status = run(&ping_config(addr)).await;

    assert_eq!(status, ExitStatus::Success);
    // ping is unauthenticated and made exactly once
    assert_eq!(recorded.calls(), vec![None]);
}

#[tokio::test]
async fn test_ping_body_is_not_parsed() {
    let router = Router::new().route("/System/Ping", get(|| async { PONG }));
    let addr = spawn_server(router).await;
    let config = ping_config(addr);

    let client =
        MediaServerClient::new(config.base_url().unwrap(), API_KEY, config.timeout).unwrap();
    assert_eq!(client.ping().await.unwrap(), PONG);

    assert_eq!(run(&config).await, ExitStatus::Success);
}

#[tokio::test]
async fn test_ping_plain_text_body() {
    let router = Router::new().route("/System/Ping", get(|| async { "Jellyfin Server" }));
    let addr = spawn_server(router).await;

    assert_eq!(run(&ping_config(addr)).await, ExitStatus::Success);
}

#[tokio::test]
async fn test_ping_server_error() {
    let router = Router::new().route(
        "/System/Ping",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = spawn_server(router).await;

    assert_eq!(run(&ping_config(addr)).await, ExitStatus::Error);
}

#[tokio::test]
async fn test_ping_connection_refused() {
    let addr = closed_addr().await;
    assert_eq!(run(&ping_config(addr)).await, ExitStatus::Error);
}

#[tokio::test]
async fn test_ping_does_not_refresh() {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/Library/Refresh", post(refresh_handler))
        .with_state(recorded.clone());
    let addr = spawn_server(router).await;

    // no ping route: 404, and the refresh endpoint must not be tried
    let mut extra = refresh_env();
    extra.push((config::COMMAND, "ping"));
    let status = run(&config_for(addr, &extra)).await;

    assert_eq!(status, ExitStatus::Error);
    assert!(recorded.calls().is_empty());
}

// ============================================================================
// Refresh mode
// ============================================================================

#[tokio::test]
async fn test_refresh_success() {
    let recorded = Recorded::default();
    let addr = spawn_server(media_server(recorded.clone())).await;

    let status = run(&config_for(addr, &refresh_env())).await;

    assert_eq!(status, ExitStatus::Success);
    assert_eq!(recorded.calls(), vec![Some(EXPECTED_AUTH.to_string())]);
}

#[tokio::test]
async fn test_refresh_with_final_dir() {
    let recorded = Recorded::default();
    let addr = spawn_server(media_server(recorded.clone())).await;
    let mut extra = refresh_env();
    extra.push((config::FINAL_DIR, "/media/tv/Show/Season 01"));

    let status = run(&config_for(addr, &extra)).await;

    assert_eq!(status, ExitStatus::Success);
    assert_eq!(recorded.calls().len(), 1);
}

#[tokio::test]
async fn test_refresh_bad_request() {
    let router = Router::new().route(
        "/Library/Refresh",
        post(|| async { (StatusCode::BAD_REQUEST, "failure") }),
    );
    let addr = spawn_server(router).await;

    let status = run(&config_for(addr, &refresh_env())).await;
    assert_eq!(status, ExitStatus::Error);
}

#[tokio::test]
async fn test_refresh_wrong_api_key() {
    let recorded = Recorded::default();
    let addr = spawn_server(media_server(recorded.clone())).await;
    let mut extra = refresh_env();
    extra.push((config::API_KEY, "WRONG"));

    let status = run(&config_for(addr, &extra)).await;

    assert_eq!(status, ExitStatus::Error);
    assert_eq!(
        recorded.calls(),
        vec![Some(r#"MediaBrowser Client="NZBGet", Token="WRONG""#.to_string())]
    );
}

#[tokio::test]
async fn test_refresh_connection_refused() {
    let addr = closed_addr().await;
    let status = run(&config_for(addr, &refresh_env())).await;
    assert_eq!(status, ExitStatus::Error);
}

#[tokio::test]
async fn test_refresh_without_directory_makes_no_request() {
    let recorded = Recorded::default();
    let addr = spawn_server(media_server(recorded.clone())).await;

    let status = run(&config_for(addr, &[])).await;

    assert_eq!(status, ExitStatus::Error);
    assert!(recorded.calls().is_empty());
}
