mod channels;
mod scheduler;
mod secrets;
mod server;
mod store;
mod telemetry;

#[cfg(test)]
mod tests;

pub use channels::*;
pub use scheduler::*;
pub use secrets::resolve_secret;
pub use server::*;
pub use store::*;
pub use telemetry::*;

use std::path::Path;

use serde::Deserialize;

use crate::error::ServerError;

/// Top-level configuration, loaded from `docwatch.toml`.
///
/// Every section is optional; a missing file yields the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct DocwatchConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Notification channels. A channel without a section is unregistered.
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub phone: PhoneConfig,
    /// OpenTelemetry distributed tracing.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl DocwatchConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read `path`, or fall back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }
}
