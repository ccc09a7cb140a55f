use docwatch_core::Channel;
use serde::Serialize;

use crate::registry::TransportRegistry;

/// Health of one registered transport.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub channel: Channel,
    pub transport: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run the health check of every registered transport, in channel order.
pub async fn check_all(registry: &TransportRegistry) -> Vec<HealthStatus> {
    let mut results = Vec::with_capacity(registry.len());
    for channel in registry.channels() {
        let Some(transport) = registry.get(channel) else {
            continue;
        };
        let error = transport.health_check().await.err().map(|e| e.to_string());
        results.push(HealthStatus {
            channel,
            transport: transport.name().to_owned(),
            healthy: error.is_none(),
            error,
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::ProviderError;
    use crate::message::ReminderMessage;
    use crate::transport::{Delivery, Transport};

    struct Unreachable;

    impl Transport for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        fn channel(&self) -> Channel {
            Channel::Whatsapp
        }

        async fn send(&self, _: &str, _: &ReminderMessage) -> Result<Delivery, ProviderError> {
            Err(ProviderError::Connection("refused".into()))
        }

        async fn health_check(&self) -> Result<(), ProviderError> {
            Err(ProviderError::Connection("refused".into()))
        }
    }

    #[tokio::test]
    async fn reports_each_transport() {
        let mut reg = TransportRegistry::new();
        reg.register(Arc::new(crate::log::LogTransport::new(Channel::Email)));
        reg.register(Arc::new(Unreachable));

        let statuses = check_all(&reg).await;
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].channel, Channel::Email);
        assert!(statuses[0].healthy);
        assert_eq!(statuses[1].transport, "unreachable");
        assert!(!statuses[1].healthy);
        assert_eq!(
            statuses[1].error.as_deref(),
            Some("connection error: refused")
        );
    }
}
