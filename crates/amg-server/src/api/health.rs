use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;

use crate::state::AppState;

use super::schemas::HealthResponse;

/// `GET /health`: liveness of the process plus reachability of its storage
/// backend.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Healthy", body = HealthResponse),
        (status = 503, description = "Storage backend unreachable", body = HealthResponse),
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = match state.adapter.health_check().await {
        Ok(true) => (StatusCode::OK, "ok"),
        Ok(false) | Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
    };

    (
        status.0,
        Json(HealthResponse {
            status: status.1.to_owned(),
            timestamp: Utc::now(),
        }),
    )
}
