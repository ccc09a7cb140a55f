use async_trait::async_trait;
use docwatch_core::Channel;

use crate::error::ProviderError;
use crate::message::ReminderMessage;

/// Receipt for a successful send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Identifier assigned by the remote service, when it returns one.
    pub message_id: Option<String>,
}

impl Delivery {
    pub fn with_id(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
        }
    }
}

/// Strongly-typed transport trait with native `async fn`.
///
/// Not object-safe; use [`DynTransport`] for dynamic dispatch. Every
/// `Transport` implements `DynTransport` through the blanket impl below.
pub trait Transport: Send + Sync {
    /// Human-readable name used in logs and health output.
    fn name(&self) -> &str;

    /// The channel this transport delivers through.
    fn channel(&self) -> Channel;

    /// Send one reminder to `destination`.
    ///
    /// `destination` is the raw address on file (phone or email); the
    /// transport is responsible for normalizing and validating it.
    fn send(
        &self,
        destination: &str,
        message: &ReminderMessage,
    ) -> impl std::future::Future<Output = Result<Delivery, ProviderError>> + Send;

    /// Verify the transport can reach its service.
    fn health_check(&self) -> impl std::future::Future<Output = Result<(), ProviderError>> + Send;
}

/// Object-safe transport trait for use behind `Arc<dyn DynTransport>`.
#[async_trait]
pub trait DynTransport: Send + Sync {
    fn name(&self) -> &str;

    fn channel(&self) -> Channel;

    async fn send(
        &self,
        destination: &str,
        message: &ReminderMessage,
    ) -> Result<Delivery, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;
}

#[async_trait]
impl<T: Transport + Sync> DynTransport for T {
    fn name(&self) -> &str {
        Transport::name(self)
    }

    fn channel(&self) -> Channel {
        Transport::channel(self)
    }

    async fn send(
        &self,
        destination: &str,
        message: &ReminderMessage,
    ) -> Result<Delivery, ProviderError> {
        Transport::send(self, destination, message).await
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Transport::health_check(self).await
    }
}
