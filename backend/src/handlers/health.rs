use axum::{extract::State, Json};

use crate::{models::challenge::HealthResponse, state::AppState};

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        active_sessions: state.sessions.session_count(),
        collected_fingerprints: state.fingerprints.len(),
    })
}
