use async_trait::async_trait;
use docwatch_provider::ProviderError;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, error, info};

use crate::backend::{EmailBackend, EmailMessage, EmailResult};
use crate::config::SmtpConfig;

/// Delivers through an SMTP relay using `lettre`.
pub struct SmtpBackend {
    config: SmtpConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl std::fmt::Debug for SmtpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpBackend")
            .field("config", &self.config)
            .field("transport", &"<AsyncSmtpTransport>")
            .finish()
    }
}

impl SmtpBackend {
    pub fn new(config: SmtpConfig) -> Result<Self, ProviderError> {
        let transport = build_transport(&config)?;
        Ok(Self { config, transport })
    }
}

#[async_trait]
impl EmailBackend for SmtpBackend {
    async fn send(&self, message: &EmailMessage) -> Result<EmailResult, ProviderError> {
        let mail = build_message(message)?;
        let message_id = mail
            .headers()
            .get_raw("Message-ID")
            .map(|id| id.trim_matches(['<', '>']).to_owned());

        debug!(subject = %message.subject, "sending email via SMTP");
        let response = self.transport.send(mail).await.map_err(|e| {
            error!(error = %e, "SMTP send failed");
            map_smtp_error(&e)
        })?;

        info!(code = %response.code(), "email accepted by SMTP relay");
        Ok(EmailResult {
            message_id,
            status: "sent".to_owned(),
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ProviderError::Connection(
                "SMTP relay refused NOOP".to_owned(),
            )),
            Err(e) => Err(ProviderError::Connection(format!(
                "SMTP health check failed: {e}"
            ))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "smtp"
    }
}

/// Build a multipart (text + HTML) `lettre::Message`.
fn build_message(msg: &EmailMessage) -> Result<Message, ProviderError> {
    let from: Mailbox = msg
        .from
        .parse()
        .map_err(|e| ProviderError::NotConfigured(format!("invalid from address: {e}")))?;
    let to: Mailbox = msg
        .to
        .parse()
        .map_err(|e| ProviderError::InvalidDestination(format!("invalid recipient address: {e}")))?;

    let mut builder = Message::builder().from(from).to(to).subject(&msg.subject);

    if let Some(reply_to) = &msg.reply_to {
        let mailbox: Mailbox = reply_to
            .parse()
            .map_err(|e| ProviderError::NotConfigured(format!("invalid reply-to address: {e}")))?;
        builder = builder.reply_to(mailbox);
    }

    builder
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(msg.text_body.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(msg.html_body.clone()),
                ),
        )
        .map_err(|e| ProviderError::ExecutionFailed(format!("failed to build email: {e}")))
}

fn build_transport(
    config: &SmtpConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, ProviderError> {
    let builder = if config.tls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| ProviderError::NotConfigured(format!("SMTP TLS relay error: {e}")))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
    };

    let builder = builder.port(config.smtp_port);

    let builder = match (&config.username, &config.password) {
        (Some(user), Some(pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
        _ => builder,
    };

    Ok(builder.build())
}

fn map_smtp_error(error: &lettre::transport::smtp::Error) -> ProviderError {
    let message = error.to_string();
    if error.is_permanent() {
        ProviderError::ExecutionFailed(format!("permanent SMTP error: {message}"))
    } else {
        ProviderError::Connection(format!("SMTP error: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            from: "DocWatch <reminders@example.com>".to_owned(),
            to: "owner@example.com".to_owned(),
            subject: "[CRITICAL] Reminder: Lease expires today".to_owned(),
            text_body: "Lease expires today".to_owned(),
            html_body: "<p>Lease expires today</p>".to_owned(),
            reply_to: Some("support@example.com".to_owned()),
        }
    }

    #[test]
    fn builds_multipart_message() {
        let mail = build_message(&message()).unwrap();
        let raw = String::from_utf8(mail.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("Reply-To: support@example.com"));
    }

    #[test]
    fn invalid_recipient_is_invalid_destination() {
        let mut msg = message();
        msg.to = "not-an-address".to_owned();
        assert!(matches!(
            build_message(&msg),
            Err(ProviderError::InvalidDestination(_))
        ));
    }

    #[test]
    fn invalid_sender_is_not_configured() {
        let mut msg = message();
        msg.from = "nobody".to_owned();
        assert!(matches!(
            build_message(&msg),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn backend_builds_without_tls() {
        let config = SmtpConfig::new("localhost").with_port(2525).with_tls(false);
        let backend = SmtpBackend::new(config).unwrap();
        assert_eq!(backend.backend_name(), "smtp");
        assert!(format!("{backend:?}").contains("SmtpBackend"));
    }
}
