use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use crate::web::models::{ApiResponse, HealthResponse};
use crate::web::server::AppState;

/// Health check: blockchain height and neighbor count alongside a fixed
/// "healthy" status — there's no separate liveness condition to report on an
/// in-memory node beyond the process being up.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthResponse>>, StatusCode> {
    let height = state
        .get_chain()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .len();

    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        blockchain_height: height,
        connected_peers: state.neighbor_count(),
    };

    Ok(Json(ApiResponse::success(response)))
}

/// Liveness probe: process is up.
pub async fn liveness() -> Json<ApiResponse<String>> {
    Json(ApiResponse::success("alive".to_string()))
}

/// Readiness probe: the chain is reachable, i.e. the lock isn't poisoned.
pub async fn readiness(State(state): State<AppState>) -> Result<Json<ApiResponse<String>>, StatusCode> {
    match state.get_chain() {
        Ok(_) => Ok(Json(ApiResponse::success("ready".to_string()))),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
