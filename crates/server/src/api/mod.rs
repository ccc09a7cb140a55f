pub mod health;
pub mod reminders;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use docwatch_scheduler::ReminderOrchestrator;
use tower_http::trace::TraceLayer;

/// Shared state passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ReminderOrchestrator>,
}

/// Trigger and health routes for the reminder service.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/v1/reminders/run", post(reminders::run_pass))
        .route(
            "/v1/users/{user_id}/documents/{document_id}/test-reminder",
            post(reminders::test_reminder),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
