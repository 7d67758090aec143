use axum::http::StatusCode;
use challenge_backend::{
    models::device_session::AssetRef,
    services::asset_store::AssetStore,
    types::{DeviceId, OrderId},
};
use serde_json::json;

mod support;
use support::{authed_json_request, get, json_request, TestApp};

async fn bind(app: &TestApp, device_id: u64, order_id: u64) {
    let res = app
        .send(authed_json_request(
            "POST",
            "/set_device_session",
            json!({ "device_id": device_id, "order_id": order_id }),
        ))
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
}

async fn upload_script(app: &TestApp, order_id: u64, script: &str) -> support::TestResponse {
    app.send(authed_json_request(
        "POST",
        &format!("/_fp-js?order_id={order_id}"),
        json!({ "fingerprinter_js": script }),
    ))
    .await
}

#[tokio::test]
async fn full_challenge_flow_completes_session_and_removes_script() {
    let app = TestApp::new();
    bind(&app, 42, 100).await;

    let res = upload_script(&app, 100, "window.fp = 1;").await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.json()["message"], "Successfully saved miner fingerprinter.");

    let res = app.send(get("/redirect?device_id=42")).await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.header("location"), Some("/_web?order_id=100"));
    assert_eq!(res.header("referrer-policy"), Some("no-referrer"));

    let res = app.send(get("/_web?order_id=100")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.header("cache-control"),
        Some("no-cache, no-store, must-revalidate")
    );
    assert!(res.body.contains("/static/js/fingerprinter_100.js"));
    assert!(res.body.contains("window.ENDPOINT = \"/fingerprint\""));

    let res = app.send(get("/static/js/fingerprinter_100.js")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "window.fp = 1;");
    assert!(res
        .header("content-type")
        .is_some_and(|v| v.starts_with("application/javascript")));

    let res = app
        .send(json_request(
            "POST",
            "/fingerprint",
            json!({ "order_id": 100, "fingerprint": "abc-123", "device_name": "MacIntel" }),
        ))
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.json()["message"], "Successfully submitted fingerprint.");

    let forwarded = app.upstream.submitted();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].order_id, OrderId::new(100));
    assert_eq!(forwarded[0].fingerprint, "abc-123");

    assert!(app.state.sessions.get_session(OrderId::new(100)).is_err());
    assert!(app
        .state
        .sessions
        .resolve_device(DeviceId::new(42))
        .is_err());
    let stored = app
        .assets
        .read(&AssetRef::for_order(OrderId::new(100)))
        .await
        .unwrap();
    assert!(stored.is_none());

    let res = app.send(get("/redirect?device_id=42")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn redirect_for_unknown_device_is_not_found() {
    let app = TestApp::new();
    let res = app.send(get("/redirect?device_id=7")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(
        res.json()["error"],
        "Session not active or device not found"
    );
    assert!(res.header("location").is_none());
}

#[tokio::test]
async fn web_page_without_script_uses_default_asset() {
    let app = TestApp::new();
    bind(&app, 1, 5).await;

    let res = app.send(get("/_web?order_id=5")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("/static/js/fingerprinter_session.js"));

    let res = app.send(get("/_web?order_id=999")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("/static/js/fingerprinter_session.js"));
}

#[tokio::test]
async fn default_script_is_served_after_any_upload() {
    let app = TestApp::new();
    let res = app.send(get("/static/js/fingerprinter_session.js")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    bind(&app, 1, 5).await;
    let res = upload_script(&app, 5, "window.fp = 5;").await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    // An order without its own script falls back to the shared one.
    bind(&app, 2, 6).await;
    let res = app.send(get("/_web?order_id=6")).await;
    assert!(res.body.contains("/static/js/fingerprinter_session.js"));

    let res = app.send(get("/static/js/fingerprinter_session.js")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "window.fp = 5;");

    // Completing the order reclaims only its own script.
    let res = app
        .send(json_request(
            "POST",
            "/fingerprint",
            json!({ "order_id": 5, "fingerprint": "abc-123" }),
        ))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.send(get("/static/js/fingerprinter_5.js")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = app.send(get("/static/js/fingerprinter_session.js")).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn script_upload_requires_active_session() {
    let app = TestApp::new();
    let res = upload_script(&app, 100, "window.fp = 1;").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let stored = app
        .assets
        .read(&AssetRef::for_order(OrderId::new(100)))
        .await
        .unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn script_upload_rejects_out_of_range_order_and_oversized_script() {
    let app = TestApp::new();
    bind(&app, 1, 100).await;

    let res = upload_script(&app, 1_000_000, "window.fp = 1;").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let huge = "x\n".repeat(1001);
    let res = upload_script(&app, 100, &huge).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn rebinding_device_moves_redirect_target() {
    let app = TestApp::new();
    bind(&app, 9, 100).await;
    bind(&app, 9, 200).await;

    let res = app.send(get("/redirect?device_id=9")).await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.header("location"), Some("/_web?order_id=200"));

    // The earlier order stays bound until it completes.
    assert!(app.state.sessions.get_session(OrderId::new(100)).is_ok());
}

#[tokio::test]
async fn upstream_failure_keeps_session_alive() {
    let app = TestApp::new();
    bind(&app, 3, 300).await;
    app.upstream.set_failing(true);

    let res = app
        .send(json_request(
            "POST",
            "/fingerprint",
            json!({ "order_id": 300, "fingerprint": "abc-123" }),
        ))
        .await;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(res.json()["error"], "Upstream challenger unavailable");
    assert!(app.state.sessions.get_session(OrderId::new(300)).is_ok());

    app.upstream.set_failing(false);
    let res = app
        .send(json_request(
            "POST",
            "/fingerprint",
            json!({ "order_id": 300, "fingerprint": "abc-123" }),
        ))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(app.state.sessions.get_session(OrderId::new(300)).is_err());
}

#[tokio::test]
async fn fingerprint_submission_validates_payload() {
    let app = TestApp::new();
    let res = app
        .send(json_request(
            "POST",
            "/fingerprint",
            json!({ "order_id": 1, "fingerprint": "not a hash!" }),
        ))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(app.upstream.submitted().is_empty());
}

#[tokio::test]
async fn static_asset_rejects_traversal_and_missing_files() {
    let app = TestApp::new();
    let res = app.send(get("/static/js/..secret.js")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.send(get("/static/js/missing.js")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn challenger_routes_require_api_key() {
    let app = TestApp::new();
    let res = app
        .send(json_request(
            "POST",
            "/set_device_session",
            json!({ "device_id": 1, "order_id": 2 }),
        ))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.state.sessions.session_count(), 0);

    let mut request = json_request(
        "POST",
        "/set_device_session",
        json!({ "device_id": 1, "order_id": 2 }),
    );
    request
        .headers_mut()
        .insert("x-api-key", "wrong-key".parse().unwrap());
    let res = app.send(request).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_reports_live_counts() {
    let app = TestApp::new();
    bind(&app, 1, 10).await;
    bind(&app, 2, 20).await;

    let res = app.send(get("/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_sessions"], 2);
    assert_eq!(body["collected_fingerprints"], 0);
}
