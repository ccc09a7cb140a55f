/// SMTP relay settings.
#[derive(Clone)]
pub struct SmtpConfig {
    pub smtp_host: String,

    /// Defaults to 587 (STARTTLS submission port).
    pub smtp_port: u16,

    pub username: Option<String>,

    pub password: Option<String>,

    /// Use STARTTLS. Defaults to `true`.
    pub tls: bool,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("tls", &self.tls)
            .finish()
    }
}

impl SmtpConfig {
    pub fn new(smtp_host: impl Into<String>) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            smtp_port: 587,
            username: None,
            password: None,
            tls: true,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }
}

/// Transactional email HTTP API settings (`POST {base}/emails`, bearer key).
#[derive(Clone)]
pub struct ApiConfig {
    pub api_key: String,
    /// Overridden in tests.
    pub api_base_url: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: "https://api.resend.com".to_owned(),
        }
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Sender identity shared by every backend.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// The `From` address, e.g. `DocWatch <reminders@example.com>`.
    pub from_address: String,
    pub reply_to: Option<String>,
}

impl EmailConfig {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
            reply_to: None,
        }
    }

    #[must_use]
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}
