use std::collections::HashMap;
use std::sync::Arc;

use docwatch_core::Channel;

use crate::error::ProviderError;
use crate::message::ReminderMessage;
use crate::transport::{Delivery, DynTransport};

/// Maps each channel to the transport that serves it.
///
/// Built once at startup and shared behind an `Arc`. A channel with no
/// registered transport is treated as unconfigured.
#[derive(Default)]
pub struct TransportRegistry {
    transports: HashMap<Channel, Arc<dyn DynTransport>>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transport under its own channel, replacing any previous one.
    pub fn register(&mut self, transport: Arc<dyn DynTransport>) {
        self.transports.insert(transport.channel(), transport);
    }

    pub fn get(&self, channel: Channel) -> Option<Arc<dyn DynTransport>> {
        self.transports.get(&channel).cloned()
    }

    /// Registered channels, sorted by name.
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self.transports.keys().copied().collect();
        channels.sort_unstable_by_key(|c| c.as_str());
        channels
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// Send through the transport registered for `channel`.
    ///
    /// Fails fast with [`ProviderError::NotConfigured`] when nothing is
    /// registered for the channel.
    pub async fn send(
        &self,
        channel: Channel,
        destination: &str,
        message: &ReminderMessage,
    ) -> Result<Delivery, ProviderError> {
        let transport = self.get(channel).ok_or_else(|| {
            ProviderError::NotConfigured(format!("no {channel} transport configured"))
        })?;
        transport.send(destination, message).await
    }
}

impl std::fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportRegistry")
            .field("channels", &self.channels())
            .finish()
    }
}
