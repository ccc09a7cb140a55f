use async_trait::async_trait;
use docwatch_provider::ProviderError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::backend::{EmailBackend, EmailMessage, EmailResult};
use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum EmailApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email API error: {0}")]
    Api(String),

    #[error("email API key missing")]
    MissingKey,

    #[error("rate limited by email API")]
    RateLimited,
}

impl From<EmailApiError> for ProviderError {
    fn from(err: EmailApiError) -> Self {
        match err {
            EmailApiError::Http(e) if e.is_decode() => ProviderError::Serialization(e.to_string()),
            EmailApiError::Http(e) => ProviderError::Connection(e.to_string()),
            EmailApiError::Api(msg) => ProviderError::ExecutionFailed(msg),
            EmailApiError::MissingKey => ProviderError::NotConfigured("email: api_key".into()),
            EmailApiError::RateLimited => ProviderError::RateLimited,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Delivers through a transactional email HTTP API.
pub struct ApiBackend {
    config: ApiConfig,
    client: Client,
}

impl std::fmt::Debug for ApiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiBackend {
    pub fn new(config: ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self { config, client }
    }

    async fn post(&self, message: &EmailMessage) -> Result<SendEmailResponse, EmailApiError> {
        if self.config.api_key.is_empty() {
            return Err(EmailApiError::MissingKey);
        }

        let body = SendEmailRequest {
            from: &message.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html_body,
            text: &message.text_body,
            reply_to: message.reply_to.as_deref(),
        };

        let response = docwatch_provider::inject_trace_context(
            self.client
                .post(format!("{}/emails", self.config.api_base_url))
                .bearer_auth(&self.config.api_key)
                .json(&body),
        )
        .send()
        .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("email API rate limit hit");
            return Err(EmailApiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&text).map_or(text, |b| b.message);
            return Err(EmailApiError::Api(format!("HTTP {status}: {detail}")));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl EmailBackend for ApiBackend {
    #[instrument(skip(self, message), fields(backend = "api"))]
    async fn send(&self, message: &EmailMessage) -> Result<EmailResult, ProviderError> {
        debug!(subject = %message.subject, "sending email via HTTP API");
        let response = self.post(message).await?;
        Ok(EmailResult {
            message_id: response.id,
            status: "queued".to_owned(),
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(EmailApiError::MissingKey.into());
        }
        let response = self
            .client
            .get(format!("{}/domains", self.config.api_base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::Connection(format!(
                "email API returned HTTP {}",
                response.status()
            )))
        }
    }

    fn backend_name(&self) -> &'static str {
        "api"
    }
}
