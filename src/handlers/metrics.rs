use axum::{extract::State, response::Json};
use std::sync::atomic::Ordering;
use tracing::debug;

use super::types::MetricsResponse;
use crate::server::state::AppState;

/// Get metrics endpoint
pub async fn get_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    debug!("Metrics requested");

    Json(MetricsResponse {
        responses: state.metrics.responses.load(Ordering::Relaxed),
        resolution_errors: state.metrics.resolution_errors.load(Ordering::Relaxed),
        nonces_issued: state.metrics.nonces_issued.load(Ordering::Relaxed),
    })
}
