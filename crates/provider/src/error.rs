use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The transport is missing its credentials, or no transport is
    /// registered for the channel.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The destination address could not be used (bad phone or email).
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    /// The remote service rejected or failed the send.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The send did not complete within the allowed duration.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The remote service rejected the request due to rate limiting.
    #[error("rate limited")]
    RateLimited,

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ProviderError {
    /// Returns `true` if the error is transient and a later attempt may
    /// succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(_) | Self::RateLimited
        )
    }
}
