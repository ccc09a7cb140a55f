use std::fmt;

use serde::Deserialize;

use super::secrets::redacted;

/// Notification channel credentials.
///
/// Every credential field accepts either the value itself or an
/// `env:VAR_NAME` reference resolved at startup.
///
/// ```toml
/// [channels.whatsapp]
/// access_token = "env:WHATSAPP_TOKEN"
/// phone_number_id = "1234567890"
///
/// [channels.email]
/// backend = "smtp"
/// from_address = "reminders@example.com"
/// smtp_host = "smtp.example.com"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ChannelsConfig {
    /// Register a logging transport for every channel instead of the real
    /// providers. Nothing leaves the process.
    #[serde(default)]
    pub dry_run: bool,
    pub whatsapp: Option<WhatsAppChannelConfig>,
    pub sms: Option<SmsChannelConfig>,
    pub email: Option<EmailChannelConfig>,
}

#[derive(Deserialize)]
pub struct WhatsAppChannelConfig {
    pub access_token: String,
    pub phone_number_id: String,
    pub api_version: Option<String>,
    pub api_base_url: Option<String>,
}

impl fmt::Debug for WhatsAppChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatsAppChannelConfig")
            .field("access_token", &redacted(&self.access_token))
            .field("phone_number_id", &self.phone_number_id)
            .field("api_version", &self.api_version)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

#[derive(Deserialize)]
pub struct SmsChannelConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub api_base_url: Option<String>,
}

impl fmt::Debug for SmsChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsChannelConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &redacted(&self.auth_token))
            .field("from_number", &self.from_number)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Which email backend delivers messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailBackendKind {
    /// Transactional email HTTP API.
    #[default]
    Api,
    Smtp,
}

#[derive(Deserialize)]
pub struct EmailChannelConfig {
    #[serde(default)]
    pub backend: EmailBackendKind,
    pub from_address: String,
    pub reply_to: Option<String>,

    pub api_key: Option<String>,
    pub api_base_url: Option<String>,

    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_tls")]
    pub tls: bool,
}

impl fmt::Debug for EmailChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailChannelConfig")
            .field("backend", &self.backend)
            .field("from_address", &self.from_address)
            .field("reply_to", &self.reply_to)
            .field("api_key", &self.api_key.as_deref().map(redacted))
            .field("api_base_url", &self.api_base_url)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_deref().map(redacted))
            .field("tls", &self.tls)
            .finish()
    }
}

fn default_tls() -> bool {
    true
}
