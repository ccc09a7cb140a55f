use docwatch_provider::ProviderError;
use thiserror::Error;

/// Errors raised while talking to the Twilio API.
///
/// Converted into [`ProviderError`] at the transport boundary.
#[derive(Debug, Error)]
pub enum TwilioError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status or error code.
    #[error("Twilio API error: {0}")]
    Api(String),

    /// Account SID, auth token, or sender number is missing.
    #[error("Twilio credentials missing: {0}")]
    MissingCredentials(&'static str),

    #[error("rate limited by Twilio")]
    RateLimited,
}

impl From<TwilioError> for ProviderError {
    fn from(err: TwilioError) -> Self {
        match err {
            TwilioError::Http(e) if e.is_timeout() => {
                ProviderError::Connection(format!("request timed out: {e}"))
            }
            TwilioError::Http(e) if e.is_decode() => ProviderError::Serialization(e.to_string()),
            TwilioError::Http(e) => ProviderError::Connection(e.to_string()),
            TwilioError::Api(msg) => ProviderError::ExecutionFailed(msg),
            TwilioError::MissingCredentials(what) => {
                ProviderError::NotConfigured(format!("sms: {what}"))
            }
            TwilioError::RateLimited => ProviderError::RateLimited,
        }
    }
}
