#![allow(dead_code)]
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use challenge_backend::{
    config::Config,
    models::challenge::FingerprintPayload,
    routes,
    services::{asset_store::FsAssetStore, scoring::ScoringConfig, upstream::UpstreamClient},
    state::AppState,
};
use serde_json::Value;
use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-api-key";

pub fn test_config() -> Config {
    Config {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        api_key: TEST_API_KEY.into(),
        challenge_base_url: "http://challenger.test".into(),
        challenge_api_key: "challenger-key".into(),
        upstream_timeout_seconds: 1,
        asset_dir: "./static/js".into(),
        session_ttl_seconds: None,
        session_sweep_interval_seconds: 60,
        cors_allow_origins: Vec::new(),
        scoring: ScoringConfig::default(),
    }
}

/// Upstream double that records every forwarded payload.
#[derive(Default)]
pub struct RecordingUpstream {
    pub submitted: Mutex<Vec<FingerprintPayload>>,
    pub fail: AtomicBool,
}

impl RecordingUpstream {
    pub fn submitted(&self) -> Vec<FingerprintPayload> {
        self.submitted.lock().expect("lock submitted").clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UpstreamClient for RecordingUpstream {
    async fn submit_fingerprint(&self, payload: &FingerprintPayload) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("challenger returned 503");
        }
        self.submitted
            .lock()
            .expect("lock submitted")
            .push(payload.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upstream: Arc<RecordingUpstream>,
    pub assets: FsAssetStore,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let assets = FsAssetStore::new(dir.path().join("js"));
        let upstream = Arc::new(RecordingUpstream::default());
        let state = AppState::new(Arc::new(assets.clone()), upstream.clone(), test_config());
        Self {
            router: routes::app(state.clone()),
            state,
            upstream,
            assets,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).to_string(),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("json body")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    let mut request = json_request(method, uri, body);
    request
        .headers_mut()
        .insert("x-api-key", TEST_API_KEY.parse().unwrap());
    request
}

pub fn authed(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-API-Key", TEST_API_KEY)
        .body(Body::empty())
        .unwrap()
}
