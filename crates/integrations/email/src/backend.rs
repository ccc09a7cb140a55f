use async_trait::async_trait;
use docwatch_provider::ProviderError;

/// A fully rendered email, independent of how it is delivered.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub reply_to: Option<String>,
}

/// Result of a successful backend send.
#[derive(Debug, Clone)]
pub struct EmailResult {
    /// Backend-assigned message identifier, if the backend returns one.
    pub message_id: Option<String>,
    /// Human-readable status (e.g. `"sent"`, `"queued"`).
    pub status: String,
}

/// Pluggable email delivery backend.
///
/// Backends only move bytes; rendering and destination checks happen in
/// [`EmailTransport`](crate::transport::EmailTransport).
#[async_trait]
pub trait EmailBackend: Send + Sync + std::fmt::Debug {
    async fn send(&self, message: &EmailMessage) -> Result<EmailResult, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Short backend name (e.g. `"api"`, `"smtp"`).
    fn backend_name(&self) -> &'static str;
}
