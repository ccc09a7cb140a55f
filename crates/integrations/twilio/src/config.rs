use docwatch_provider::DEFAULT_COUNTRY_CODE;

/// Credentials and endpoint for the SMS channel.
#[derive(Clone)]
pub struct TwilioConfig {
    /// Account SID, also the HTTP Basic user name.
    pub account_sid: String,

    pub auth_token: String,

    /// Sender number in E.164 form.
    pub from_number: String,

    /// Country code prefixed to bare 10-digit destinations.
    pub default_country_code: String,

    /// Base URL for the REST API. Overridden in tests.
    pub api_base_url: String,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .field("default_country_code", &self.default_country_code)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl TwilioConfig {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
            default_country_code: DEFAULT_COUNTRY_CODE.to_owned(),
            api_base_url: "https://api.twilio.com".to_owned(),
        }
    }

    #[must_use]
    pub fn with_default_country_code(mut self, code: impl Into<String>) -> Self {
        self.default_country_code = code.into();
        self
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}
