use axum::Json;
use axum::extract::State;
use docwatch_provider::{HealthStatus, check_all};
use docwatch_scheduler::MetricsSnapshot;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"ok"` when every registered transport passed its check, else
    /// `"degraded"`.
    pub status: &'static str,
    pub metrics: MetricsSnapshot,
    pub transports: Vec<HealthStatus>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let transports = check_all(state.orchestrator.transports()).await;
    let status = if transports.iter().all(|t| t.healthy) {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse {
        status,
        metrics: state.orchestrator.metrics().snapshot(),
        transports,
    })
}
