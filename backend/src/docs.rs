#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    handlers::fingerprints::ResetResponse,
    models::{
        challenge::{
            DeviceQuery, DeviceSessionPayload, FingerprintPayload, FingerprinterPayload,
            HealthResponse, MessageResponse, OrderQuery,
        },
        fingerprint::{CollectFingerprintPayload, FingerprintRecord, ScoreBreakdown, ScoringResult},
    },
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        set_device_session_doc,
        post_fingerprinter_doc,
        redirect_doc,
        web_doc,
        static_asset_doc,
        submit_fingerprint_doc,
        collect_fingerprint_doc,
        reset_fingerprints_doc,
        results_doc,
        health_doc
    ),
    components(
        schemas(
            DeviceSessionPayload,
            FingerprinterPayload,
            FingerprintPayload,
            MessageResponse,
            HealthResponse,
            CollectFingerprintPayload,
            FingerprintRecord,
            ResetResponse,
            ScoringResult,
            ScoreBreakdown
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Challenge", description = "Device binding, redirect and fingerprint submission"),
        (name = "Scoring", description = "Fingerprint rounds and fraud scoring")
    )
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "ApiKeyAuth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
        );
    }
}

#[utoipa::path(
    post,
    path = "/set_device_session",
    request_body = DeviceSessionPayload,
    responses(
        (status = 200, description = "Device bound to order", body = MessageResponse),
        (status = 401, description = "Missing or invalid API key")
    ),
    tag = "Challenge",
    security(("ApiKeyAuth" = []))
)]
fn set_device_session_doc() {}

#[utoipa::path(
    post,
    path = "/_fp-js",
    params(OrderQuery),
    request_body = FingerprinterPayload,
    responses(
        (status = 200, description = "Script stored and attached", body = MessageResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Session not active")
    ),
    tag = "Challenge",
    security(("ApiKeyAuth" = []))
)]
fn post_fingerprinter_doc() {}

#[utoipa::path(
    get,
    path = "/redirect",
    params(DeviceQuery),
    responses(
        (status = 307, description = "Redirect to the session page"),
        (status = 404, description = "Session not active or device not found")
    ),
    tag = "Challenge"
)]
fn redirect_doc() {}

#[utoipa::path(
    get,
    path = "/_web",
    params(OrderQuery),
    responses((status = 200, description = "Challenge page", content_type = "text/html")),
    tag = "Challenge"
)]
fn web_doc() {}

#[utoipa::path(
    get,
    path = "/static/js/{name}",
    params(("name" = String, Path, description = "Asset name")),
    responses(
        (status = 200, description = "Fingerprinter script", content_type = "application/javascript"),
        (status = 404, description = "Asset not found")
    ),
    tag = "Challenge"
)]
fn static_asset_doc() {}

#[utoipa::path(
    post,
    path = "/fingerprint",
    request_body = FingerprintPayload,
    responses(
        (status = 200, description = "Fingerprint accepted by the challenger", body = MessageResponse),
        (status = 400, description = "Validation failed"),
        (status = 502, description = "Challenger unavailable")
    ),
    tag = "Challenge"
)]
fn submit_fingerprint_doc() {}

#[utoipa::path(
    post,
    path = "/fingerprints",
    request_body = CollectFingerprintPayload,
    responses((status = 200, body = MessageResponse)),
    tag = "Scoring",
    security(("ApiKeyAuth" = []))
)]
fn collect_fingerprint_doc() {}

#[utoipa::path(
    delete,
    path = "/fingerprints",
    responses((status = 200, body = ResetResponse)),
    tag = "Scoring",
    security(("ApiKeyAuth" = []))
)]
fn reset_fingerprints_doc() {}

#[utoipa::path(
    get,
    path = "/fingerprints/results",
    responses((status = 200, description = "Score of the current round", body = ScoringResult)),
    tag = "Scoring",
    security(("ApiKeyAuth" = []))
)]
fn results_doc() {}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, body = HealthResponse))
)]
fn health_doc() {}
