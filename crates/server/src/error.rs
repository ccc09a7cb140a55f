use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while starting or serving docwatch.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] docwatch_scheduler::SchedulerError),

    #[error("store error: {0}")]
    Store(#[from] docwatch_store::StoreError),

    #[error("provider error: {0}")]
    Provider(#[from] docwatch_provider::ProviderError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Store(docwatch_store::StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Store(docwatch_store::StoreError::Connection(_)) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
