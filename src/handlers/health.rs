use axum::{extract::State, response::Json};
use tracing::debug;

use super::types::HealthResponse;
use crate::server::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!("Health check");

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        configured: state.engine.store().is_configured(),
        profiles: state.engine.store().names(),
    })
}
