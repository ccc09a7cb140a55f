use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use docwatch_scheduler::PassReport;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RunPassQuery {
    /// Evaluate as of this day instead of the current UTC date.
    pub date: Option<NaiveDate>,
}

/// `POST /v1/reminders/run`
///
/// Runs one pass and returns its report. An aborted pass answers 503 with
/// the report as body.
pub async fn run_pass(
    State(state): State<AppState>,
    Query(query): Query<RunPassQuery>,
) -> (StatusCode, Json<PassReport>) {
    let report = match query.date {
        Some(date) => state.orchestrator.run_pass_for(date).await,
        None => state.orchestrator.run_scheduled_pass().await,
    };
    let status = if report.is_aborted() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(report))
}

#[derive(Debug, Serialize)]
pub struct TestReminderResponse {
    pub delivered: bool,
}

/// `POST /v1/users/{user_id}/documents/{document_id}/test-reminder`
///
/// Sends immediately, ignoring the schedule and the daily dedup. Nothing is
/// recorded.
pub async fn test_reminder(
    State(state): State<AppState>,
    Path((user_id, document_id)): Path<(Uuid, Uuid)>,
) -> Json<TestReminderResponse> {
    let delivered = state
        .orchestrator
        .send_test_reminder(user_id, document_id)
        .await;
    Json(TestReminderResponse { delivered })
}
