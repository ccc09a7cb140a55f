//! Channel selection and fail-soft delivery.

use std::sync::Arc;
use std::time::Duration;

use docwatch_core::{Channel, DocumentCandidate};
use docwatch_provider::{Delivery, ProviderError, ReminderMessage, TransportRegistry};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Where one reminder goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub channel: Channel,
    /// Raw phone number or email address on file.
    pub destination: String,
    /// Email address to retry once if the first channel fails.
    pub email_fallback: Option<String>,
    /// The preferred channel was already swapped for email during resolution.
    pub fell_back: bool,
}

impl Route {
    /// Pick the channel and destination for a candidate.
    ///
    /// The preferred channel defaults to email. A chat preference with no
    /// phone on file is routed to email up front; an SMS preference with no
    /// phone is not. Returns `None` when the chosen channel has no usable
    /// destination.
    pub fn resolve(candidate: &DocumentCandidate) -> Option<Self> {
        let preferred = candidate.preferred_channel.unwrap_or(Channel::Email);
        let email = candidate.email_address().map(str::to_owned);

        match (preferred, candidate.phone()) {
            (Channel::Email, _) => email.map(|destination| Self::direct(Channel::Email, destination)),
            (Channel::Whatsapp, None) => email.map(|destination| Self {
                channel: Channel::Email,
                destination,
                email_fallback: None,
                fell_back: true,
            }),
            (Channel::Sms, None) => None,
            (channel, Some(phone)) => Some(Self {
                channel,
                destination: phone.to_owned(),
                email_fallback: email,
                fell_back: false,
            }),
        }
    }

    fn direct(channel: Channel, destination: String) -> Self {
        Self {
            channel,
            destination,
            email_fallback: None,
            fell_back: false,
        }
    }
}

/// Result of delivering one reminder, fallback included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered {
        /// Channel the message actually went out on.
        channel: Channel,
        message_id: Option<String>,
        fell_back: bool,
    },
    Failed {
        /// Last channel attempted.
        channel: Channel,
        reason: String,
    },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    pub fn channel(&self) -> Channel {
        match self {
            Self::Delivered { channel, .. } | Self::Failed { channel, .. } => *channel,
        }
    }
}

/// Sends reminders through the registered transports.
///
/// Every error, including an elapsed per-attempt timeout and an unregistered
/// channel, ends up in [`DeliveryOutcome::Failed`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<TransportRegistry>,
    delivery_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<TransportRegistry>, delivery_timeout: Duration) -> Self {
        Self {
            registry,
            delivery_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<TransportRegistry> {
        &self.registry
    }

    /// Deliver along `route`, retrying once by email if the route allows it.
    pub async fn deliver(&self, route: &Route, message: &ReminderMessage) -> DeliveryOutcome {
        let first = self
            .attempt(route.channel, &route.destination, message)
            .await;

        let err = match first {
            Ok(delivery) => {
                info!(channel = %route.channel, fell_back = route.fell_back, "reminder delivered");
                return DeliveryOutcome::Delivered {
                    channel: route.channel,
                    message_id: delivery.message_id,
                    fell_back: route.fell_back,
                };
            }
            Err(err) => err,
        };

        warn!(
            channel = %route.channel,
            error = %err,
            retryable = err.is_retryable(),
            "delivery attempt failed"
        );

        let Some(email) = route.email_fallback.as_deref() else {
            return DeliveryOutcome::Failed {
                channel: route.channel,
                reason: err.to_string(),
            };
        };

        debug!("retrying through email");
        match self.attempt(Channel::Email, email, message).await {
            Ok(delivery) => {
                info!(channel = %Channel::Email, fell_back = true, "reminder delivered");
                DeliveryOutcome::Delivered {
                    channel: Channel::Email,
                    message_id: delivery.message_id,
                    fell_back: true,
                }
            }
            Err(fallback_err) => {
                warn!(
                    error = %fallback_err,
                    retryable = fallback_err.is_retryable(),
                    "email fallback failed"
                );
                DeliveryOutcome::Failed {
                    channel: Channel::Email,
                    reason: format!("{}: {err}; email fallback: {fallback_err}", route.channel),
                }
            }
        }
    }

    async fn attempt(
        &self,
        channel: Channel,
        destination: &str,
        message: &ReminderMessage,
    ) -> Result<Delivery, ProviderError> {
        tokio::time::timeout(
            self.delivery_timeout,
            self.registry.send(channel, destination, message),
        )
        .await
        .unwrap_or(Err(ProviderError::Timeout(self.delivery_timeout)))
    }
}
