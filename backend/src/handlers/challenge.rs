//! Device challenge flow: binding, script upload, redirect, page, submission.

use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    middleware::request_id::RequestId,
    models::{
        challenge::{
            DeviceQuery, DeviceSessionPayload, FingerprintPayload, FingerprinterPayload,
            MessageResponse, OrderQuery,
        },
        device_session::AssetRef,
    },
    state::AppState,
    validation::rules,
};

pub const STATIC_JS_PREFIX: &str = "/static/js";
const FINGERPRINT_ENDPOINT: &str = "/fingerprint";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="referrer" content="no-referrer">
  <title>Device check</title>
</head>
<body>
  <p>Checking your device&hellip;</p>
  <script>window.ENDPOINT = "{{endpoint}}";</script>
  <script src="{{fingerprinter_js_path}}"></script>
</body>
</html>
"#;

pub async fn set_device_session(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(payload): Json<DeviceSessionPayload>,
) -> Json<MessageResponse> {
    state
        .sessions
        .create_session(payload.device_id, payload.order_id);
    tracing::info!(
        request_id = %request_id.0,
        device_id = %payload.device_id,
        order_id = %payload.order_id,
        "Device session set"
    );
    Json(MessageResponse::new("Device session set successfully."))
}

/// Stores the order's fingerprinter script and attaches it to the session.
///
/// The script is written before it is attached, so a session never points at
/// an asset that does not exist yet.
pub async fn post_fingerprinter(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<OrderQuery>,
    Json(payload): Json<FingerprinterPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    query.validate()?;
    payload.validate()?;
    let order_id = query.order_id;

    state.sessions.get_session(order_id)?;

    let asset = AssetRef::for_order(order_id);
    state
        .assets
        .write(&asset, &payload.fingerprinter_js)
        .await?;

    if let Err(err) = state.sessions.attach_asset(order_id, asset.clone()) {
        // The session completed while the script was being written.
        if let Err(cleanup) = state.assets.delete(&asset).await {
            tracing::warn!(asset = %asset, error = ?cleanup, "Failed to delete unattached asset");
        }
        return Err(err.into());
    }

    // Latest upload doubles as the script for orders without their own.
    if let Err(err) = state
        .assets
        .write(&AssetRef::default(), &payload.fingerprinter_js)
        .await
    {
        tracing::warn!(error = ?err, "Failed to refresh default fingerprinter script");
    }

    tracing::info!(
        request_id = %request_id.0,
        %order_id,
        asset = %asset,
        "Saved fingerprinter script"
    );
    Ok(Json(MessageResponse::new(
        "Successfully saved miner fingerprinter.",
    )))
}

/// Sends the device on to its session page without leaking `device_id`
/// through the referrer.
pub async fn get_redirect(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<DeviceQuery>,
) -> Result<Response, AppError> {
    let device_id = query.device_id;
    tracing::info!(request_id = %request_id.0, %device_id, "Redirecting device");

    let order_id = state.sessions.resolve_device(device_id).inspect_err(|_| {
        tracing::warn!(request_id = %request_id.0, %device_id, "No active session for device");
    })?;

    let location = format!("/_web?order_id={}", order_id);
    tracing::info!(request_id = %request_id.0, %device_id, %location, "Redirect resolved");
    Ok((
        StatusCode::TEMPORARY_REDIRECT,
        [
            (header::LOCATION, location),
            (header::REFERRER_POLICY, "no-referrer".to_string()),
        ],
    )
        .into_response())
}

pub async fn get_web(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<OrderQuery>,
) -> Result<(HeaderMap, Html<String>), AppError> {
    query.validate()?;
    let asset = state.sessions.lookup_asset(query.order_id);
    tracing::info!(
        request_id = %request_id.0,
        order_id = %query.order_id,
        asset = %asset,
        "Serving challenge page"
    );
    Ok((no_cache_headers(), Html(render_index(&asset))))
}

pub async fn get_static_asset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    if rules::validate_asset_name(&name).is_err() {
        return Err(AppError::NotFound("Asset not found".into()));
    }
    let contents = state
        .assets
        .read(&AssetRef::new(name))
        .await?
        .ok_or_else(|| AppError::NotFound("Asset not found".into()))?;

    let mut headers = no_cache_headers();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/javascript; charset=utf-8"),
    );
    Ok((headers, contents).into_response())
}

/// Forwards the fingerprint to the challenger, then completes the session.
pub async fn post_fingerprint(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(payload): Json<FingerprintPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let order_id = payload.order_id;
    tracing::info!(request_id = %request_id.0, %order_id, "Submitting fingerprint");

    state
        .upstream
        .submit_fingerprint(&payload)
        .await
        .map_err(AppError::BadGateway)?;

    if let Some(asset) = state
        .sessions
        .delete_session(order_id)
        .filter(|asset| !asset.is_default())
    {
        if let Err(err) = state.assets.delete(&asset).await {
            tracing::warn!(asset = %asset, error = ?err, "Failed to delete completed asset");
        }
    }

    tracing::info!(request_id = %request_id.0, %order_id, "Submitted fingerprint");
    Ok(Json(MessageResponse::new("Successfully submitted fingerprint.")))
}

pub fn render_index(asset: &AssetRef) -> String {
    INDEX_HTML
        .replace("{{endpoint}}", FINGERPRINT_ENDPOINT)
        .replace(
            "{{fingerprinter_js_path}}",
            &format!("{}/{}", STATIC_JS_PREFIX, asset),
        )
}

fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers
}
