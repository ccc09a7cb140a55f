use docwatch_core::Channel;
use docwatch_provider::{Delivery, ProviderError, ReminderMessage, Transport};
use lettre::Address;
use tracing::{debug, info, instrument};

use crate::backend::{EmailBackend, EmailMessage};
use crate::config::EmailConfig;
use crate::render::HtmlRenderer;

/// Email channel: renders the reminder and hands it to a backend.
pub struct EmailTransport {
    config: EmailConfig,
    backend: Box<dyn EmailBackend>,
    renderer: HtmlRenderer,
}

impl std::fmt::Debug for EmailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailTransport")
            .field("config", &self.config)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl EmailTransport {
    pub fn new(config: EmailConfig, backend: Box<dyn EmailBackend>) -> Result<Self, ProviderError> {
        Ok(Self {
            config,
            backend,
            renderer: HtmlRenderer::new()?,
        })
    }

    fn compose(&self, to: &str, message: &ReminderMessage) -> Result<EmailMessage, ProviderError> {
        Ok(EmailMessage {
            from: self.config.from_address.clone(),
            to: to.to_owned(),
            subject: message.email_subject(),
            text_body: message.email_text(),
            html_body: self.renderer.render(message)?,
            reply_to: self.config.reply_to.clone(),
        })
    }
}

impl Transport for EmailTransport {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "email"
    }

    fn channel(&self) -> Channel {
        Channel::Email
    }

    #[instrument(skip(self, destination, message), fields(transport = "email", backend = self.backend.backend_name()))]
    async fn send(
        &self,
        destination: &str,
        message: &ReminderMessage,
    ) -> Result<Delivery, ProviderError> {
        if self.config.from_address.is_empty() {
            return Err(ProviderError::NotConfigured("email: from_address".into()));
        }
        destination
            .parse::<Address>()
            .map_err(|e| ProviderError::InvalidDestination(format!("{destination:?}: {e}")))?;

        let email = self.compose(destination, message)?;
        debug!(subject = %email.subject, "sending reminder email");

        let result = self.backend.send(&email).await?;
        info!(status = %result.status, message_id = ?result.message_id, "reminder email sent");
        Ok(Delivery {
            message_id: result.message_id,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.backend.health_check().await
    }
}
