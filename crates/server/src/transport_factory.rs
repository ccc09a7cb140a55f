use std::sync::Arc;

use docwatch_core::Channel;
use docwatch_email::{ApiBackend, ApiConfig, EmailBackend, EmailConfig, EmailTransport, SmtpBackend, SmtpConfig};
use docwatch_provider::{LogTransport, TransportRegistry};
use docwatch_twilio::{TwilioConfig, TwilioTransport};
use docwatch_whatsapp::{WhatsAppConfig, WhatsAppTransport};
use tracing::{info, warn};

use crate::config::{
    ChannelsConfig, EmailBackendKind, EmailChannelConfig, PhoneConfig, SmsChannelConfig,
    WhatsAppChannelConfig, resolve_secret,
};
use crate::error::ServerError;

/// Register one transport per configured channel.
///
/// Channels without a section stay unregistered; sends on them fail and
/// fall back to email where possible. Missing credentials do not fail
/// startup. Only an SMTP backend without a host is rejected.
pub fn build_registry(
    channels: &ChannelsConfig,
    phone: &PhoneConfig,
) -> Result<TransportRegistry, ServerError> {
    let mut registry = TransportRegistry::new();

    if channels.dry_run {
        for channel in [Channel::Whatsapp, Channel::Sms, Channel::Email] {
            registry.register(Arc::new(LogTransport::new(channel)));
        }
        warn!("channels.dry_run is set, reminders are logged and not delivered");
        return Ok(registry);
    }

    if let Some(config) = &channels.whatsapp {
        registry.register(Arc::new(whatsapp(config, phone)));
    }
    if let Some(config) = &channels.sms {
        registry.register(Arc::new(sms(config, phone)));
    }
    if let Some(config) = &channels.email {
        registry.register(Arc::new(email(config)?));
    }

    if registry.get(Channel::Email).is_none() {
        warn!("no email channel configured, fallback deliveries will fail");
    }
    info!(channels = ?registry.channels(), "transports registered");
    Ok(registry)
}

/// Resolve one channel credential.
///
/// An unset `env:` reference or a blank value is logged and left empty, so
/// the channel stays registered and its sends fail as not configured.
fn credential(channel: Channel, field: &'static str, value: &str) -> String {
    match resolve_secret(value) {
        Ok(resolved) if !resolved.trim().is_empty() => resolved,
        Ok(_) => {
            warn!(%channel, field, "credential is blank, sends on this channel will fail");
            String::new()
        }
        Err(e) => {
            warn!(%channel, field, error = %e, "credential unavailable, sends on this channel will fail");
            String::new()
        }
    }
}

fn whatsapp(config: &WhatsAppChannelConfig, phone: &PhoneConfig) -> WhatsAppTransport {
    let channel = Channel::Whatsapp;
    let mut wa = WhatsAppConfig::new(
        credential(channel, "access_token", &config.access_token),
        credential(channel, "phone_number_id", &config.phone_number_id),
    )
    .with_default_country_code(&phone.default_country_code);
    if let Some(version) = &config.api_version {
        wa = wa.with_api_version(version);
    }
    if let Some(url) = &config.api_base_url {
        wa = wa.with_api_base_url(url);
    }
    WhatsAppTransport::new(wa)
}

fn sms(config: &SmsChannelConfig, phone: &PhoneConfig) -> TwilioTransport {
    let channel = Channel::Sms;
    let mut twilio = TwilioConfig::new(
        credential(channel, "account_sid", &config.account_sid),
        credential(channel, "auth_token", &config.auth_token),
        credential(channel, "from_number", &config.from_number),
    )
    .with_default_country_code(&phone.default_country_code);
    if let Some(url) = &config.api_base_url {
        twilio = twilio.with_api_base_url(url);
    }
    TwilioTransport::new(twilio)
}

fn email(config: &EmailChannelConfig) -> Result<EmailTransport, ServerError> {
    let channel = Channel::Email;
    let backend: Box<dyn EmailBackend> = match config.backend {
        EmailBackendKind::Api => {
            let key = config.api_key.as_deref().unwrap_or_default();
            let mut api = ApiConfig::new(credential(channel, "api_key", key));
            if let Some(url) = &config.api_base_url {
                api = api.with_api_base_url(url);
            }
            Box::new(ApiBackend::new(api))
        }
        EmailBackendKind::Smtp => {
            let host = config.smtp_host.as_deref().ok_or_else(|| {
                ServerError::Config("[channels.email] smtp backend requires smtp_host".into())
            })?;
            let mut smtp = SmtpConfig::new(host).with_tls(config.tls);
            if let Some(port) = config.smtp_port {
                smtp = smtp.with_port(port);
            }
            if let (Some(user), Some(password)) = (&config.username, &config.password) {
                smtp = smtp.with_credentials(user, credential(channel, "password", password));
            }
            Box::new(SmtpBackend::new(smtp)?)
        }
    };

    let mut email = EmailConfig::new(&config.from_address);
    if let Some(reply_to) = &config.reply_to {
        email = email.with_reply_to(reply_to);
    }
    Ok(EmailTransport::new(email, backend)?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use docwatch_provider::{ProviderError, ReminderMessage};

    use crate::config::DocwatchConfig;

    use super::*;

    fn registry(toml: &str) -> Result<TransportRegistry, ServerError> {
        let config = DocwatchConfig::from_toml(toml).unwrap();
        build_registry(&config.channels, &config.phone)
    }

    #[test]
    fn no_sections_registers_nothing() {
        assert!(registry("").unwrap().is_empty());
    }

    #[test]
    fn dry_run_covers_every_channel() {
        let registry = registry("[channels]\ndry_run = true").unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(Channel::Sms).unwrap().name(), "log-sms");
    }

    #[test]
    fn configured_sections_are_registered() {
        let registry = registry(
            r#"
            [channels.whatsapp]
            access_token = "token"
            phone_number_id = "1234567890"

            [channels.sms]
            account_sid = "AC123"
            auth_token = "secret"
            from_number = "+15551234567"

            [channels.email]
            from_address = "reminders@example.com"
            api_key = "key"
            "#,
        )
        .unwrap();
        assert_eq!(
            registry.channels(),
            vec![Channel::Email, Channel::Sms, Channel::Whatsapp]
        );
    }

    fn message() -> ReminderMessage {
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        ReminderMessage::new("Trade Licence", NaiveDate::from_ymd_opt(2026, 10, 22).unwrap(), today)
    }

    async fn assert_not_configured(registry: &TransportRegistry, channel: Channel, destination: &str) {
        let err = registry.send(channel, destination, &message()).await.unwrap_err();
        assert!(
            matches!(err, ProviderError::NotConfigured(_)),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn api_email_without_key_sends_fail_as_not_configured() {
        let registry = registry(
            r#"
            [channels.email]
            from_address = "reminders@example.com"
            "#,
        )
        .unwrap();
        assert!(registry.get(Channel::Email).is_some());
        assert_not_configured(&registry, Channel::Email, "owner@example.com").await;
    }

    #[test]
    fn smtp_email_without_host_is_rejected() {
        let err = registry(
            r#"
            [channels.email]
            backend = "smtp"
            from_address = "reminders@example.com"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("requires smtp_host"));
    }

    #[tokio::test]
    async fn blank_sms_field_sends_fail_as_not_configured() {
        let registry = registry(
            r#"
            [channels.sms]
            account_sid = ""
            auth_token = "secret"
            from_number = "+15551234567"
            "#,
        )
        .unwrap();
        assert_eq!(registry.channels(), vec![Channel::Sms]);
        assert_not_configured(&registry, Channel::Sms, "8851670050").await;
    }

    #[tokio::test]
    async fn unset_env_secret_leaves_other_channels_usable() {
        let registry = registry(
            r#"
            [channels.whatsapp]
            access_token = "env:DOCWATCH_TEST_UNSET_WHATSAPP_TOKEN"
            phone_number_id = "1234567890"

            [channels.email]
            from_address = "reminders@example.com"
            api_key = "key"
            "#,
        )
        .unwrap();
        assert_eq!(registry.channels(), vec![Channel::Email, Channel::Whatsapp]);
        assert_not_configured(&registry, Channel::Whatsapp, "8851670050").await;
    }
}
