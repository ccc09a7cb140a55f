use std::collections::HashMap;

use serde::Deserialize;

/// OTLP span export for the reminder pipeline.
///
/// ```toml
/// [telemetry]
/// enabled = true
/// endpoint = "http://localhost:4317"
/// protocol = "grpc"
/// ```
#[derive(Debug, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// `1.0` samples every pass; `0.0` or below disables sampling.
    #[serde(default = "default_sample_ratio")]
    pub sample_ratio: f64,
    /// `"grpc"` or `"http"`.
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub resource_attributes: HashMap<String, String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            service_name: default_service_name(),
            sample_ratio: default_sample_ratio(),
            protocol: default_protocol(),
            timeout_seconds: default_timeout(),
            resource_attributes: HashMap::new(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:4317".to_owned()
}

fn default_service_name() -> String {
    "docwatch".to_owned()
}

fn default_sample_ratio() -> f64 {
    1.0
}

fn default_protocol() -> String {
    "grpc".to_owned()
}

fn default_timeout() -> u64 {
    10
}
