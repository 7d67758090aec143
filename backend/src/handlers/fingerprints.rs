//! Scoring rounds: collect submissions, reset the round, compute the score.

use axum::{
    extract::{Extension, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppError,
    middleware::request_id::RequestId,
    models::{
        challenge::MessageResponse,
        fingerprint::{CollectFingerprintPayload, ScoringResult},
    },
    services::scoring,
    state::AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    pub message: String,
    pub cleared: usize,
}

pub async fn collect_fingerprint(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(payload): Json<CollectFingerprintPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    tracing::debug!(
        request_id = %request_id.0,
        device_label = %payload.device_label,
        "Collected fingerprint"
    );
    state.fingerprints.append(payload.into());
    Ok(Json(MessageResponse::new("Fingerprint collected.")))
}

pub async fn reset_fingerprints(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Json<ResetResponse> {
    let cleared = state.fingerprints.clear();
    tracing::info!(request_id = %request_id.0, cleared, "Started new fingerprint round");
    Json(ResetResponse {
        message: "Fingerprint round reset.".into(),
        cleared,
    })
}

pub async fn get_results(State(state): State<AppState>) -> Json<ScoringResult> {
    let snapshot = state.fingerprints.snapshot();
    Json(scoring::score(&snapshot, &state.config.scoring))
}
