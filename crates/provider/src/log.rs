use docwatch_core::Channel;
use tracing::info;

use crate::error::ProviderError;
use crate::message::ReminderMessage;
use crate::transport::{Delivery, Transport};

/// A transport that logs the reminder and reports success without any
/// external I/O.
///
/// Useful for local development when no channel credentials are at hand.
pub struct LogTransport {
    channel: Channel,
    name: String,
}

impl LogTransport {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            name: format!("log-{channel}"),
        }
    }
}

impl Transport for LogTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel(&self) -> Channel {
        self.channel
    }

    #[allow(clippy::unused_async)]
    async fn send(
        &self,
        destination: &str,
        message: &ReminderMessage,
    ) -> Result<Delivery, ProviderError> {
        info!(
            transport = %self.name,
            destination,
            title = %message.title,
            tier = %message.tier(),
            days_until_expiry = message.days_until_expiry,
            "log transport delivered reminder"
        );
        Ok(Delivery::default())
    }

    #[allow(clippy::unused_async)]
    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
