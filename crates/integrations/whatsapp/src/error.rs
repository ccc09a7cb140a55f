use docwatch_provider::ProviderError;
use thiserror::Error;

/// Errors raised while talking to the WhatsApp Cloud API.
#[derive(Debug, Error)]
pub enum WhatsAppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WhatsApp API error: {0}")]
    Api(String),

    #[error("WhatsApp credentials missing: {0}")]
    MissingCredentials(&'static str),

    #[error("rate limited by WhatsApp")]
    RateLimited,
}

impl From<WhatsAppError> for ProviderError {
    fn from(err: WhatsAppError) -> Self {
        match err {
            WhatsAppError::Http(e) if e.is_decode() => ProviderError::Serialization(e.to_string()),
            WhatsAppError::Http(e) => ProviderError::Connection(e.to_string()),
            WhatsAppError::Api(msg) => ProviderError::ExecutionFailed(msg),
            WhatsAppError::MissingCredentials(what) => {
                ProviderError::NotConfigured(format!("whatsapp: {what}"))
            }
            WhatsAppError::RateLimited => ProviderError::RateLimited,
        }
    }
}
