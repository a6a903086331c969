//! Liveness and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use market_service::dto::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /health/ready
///
/// The database check passes trivially on the in-memory backend.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database_healthy = match state.database() {
        Some(pool) => pool.acquire().await.is_ok(),
        None => true,
    };

    let storage_healthy = match state.service_context().image_store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Image store ping failed");
            false
        }
    };

    let response = ReadinessResponse::ready(database_healthy, storage_healthy);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
