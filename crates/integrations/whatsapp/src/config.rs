use docwatch_provider::DEFAULT_COUNTRY_CODE;

const DEFAULT_API_VERSION: &str = "v18.0";

/// Credentials and endpoint for the chat-message channel.
#[derive(Clone)]
pub struct WhatsAppConfig {
    /// Bearer token for the Graph API.
    pub access_token: String,

    /// Sender id (the business phone-number id, not the number itself).
    pub phone_number_id: String,

    pub api_version: String,

    /// Country code prefixed to bare 10-digit destinations.
    pub default_country_code: String,

    /// Base URL for the Graph API. Overridden in tests.
    pub api_base_url: String,
}

impl std::fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("access_token", &"[REDACTED]")
            .field("phone_number_id", &self.phone_number_id)
            .field("api_version", &self.api_version)
            .field("default_country_code", &self.default_country_code)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl WhatsAppConfig {
    pub fn new(access_token: impl Into<String>, phone_number_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            phone_number_id: phone_number_id.into(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            default_country_code: DEFAULT_COUNTRY_CODE.to_owned(),
            api_base_url: "https://graph.facebook.com".to_owned(),
        }
    }

    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    #[must_use]
    pub fn with_default_country_code(mut self, code: impl Into<String>) -> Self {
        self.default_country_code = code.into();
        self
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WhatsAppConfig::new("token", "10987654321");
        assert_eq!(config.api_base_url, "https://graph.facebook.com");
        assert_eq!(config.api_version, "v18.0");
        assert_eq!(config.default_country_code, "91");
    }

    #[test]
    fn debug_redacts_access_token() {
        let config = WhatsAppConfig::new("EAAG-secret-value", "10987654321");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("EAAG-secret-value"));
        assert!(debug.contains("10987654321"));
    }
}
