use serde::Deserialize;

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum time to wait for the scheduler to finish an in-flight pass
    /// during shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    8080
}

/// Phone normalization policy shared by the chat and SMS channels.
#[derive(Debug, Deserialize)]
pub struct PhoneConfig {
    /// Prefixed to bare 10-digit numbers.
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            default_country_code: default_country_code(),
        }
    }
}

fn default_country_code() -> String {
    docwatch_provider::DEFAULT_COUNTRY_CODE.to_owned()
}
