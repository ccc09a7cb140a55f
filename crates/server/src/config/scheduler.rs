use std::time::Duration;

use docwatch_scheduler::{OrchestratorConfig, ScheduleConfig};
use serde::Deserialize;

/// When reminder passes run and how deliveries are bounded.
#[derive(Debug, Deserialize)]
pub struct SchedulerConfig {
    /// Run passes on the cron schedule. Manual passes through the API and
    /// `run-once` work either way.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cron")]
    pub cron: String,
    /// IANA timezone the cron expression is evaluated in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_seconds: u64,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default)]
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            cron: default_cron(),
            timezone: default_timezone(),
            delivery_timeout_seconds: default_delivery_timeout(),
            max_concurrent: default_max_concurrent(),
            run_on_startup: false,
        }
    }
}

impl SchedulerConfig {
    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            delivery_timeout: Duration::from_secs(self.delivery_timeout_seconds),
            max_concurrent: self.max_concurrent,
        }
    }

    pub fn schedule(&self) -> ScheduleConfig {
        ScheduleConfig {
            cron: self.cron.clone(),
            timezone: self.timezone.clone(),
            run_on_startup: self.run_on_startup,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_cron() -> String {
    ScheduleConfig::default().cron
}

fn default_timezone() -> String {
    ScheduleConfig::default().timezone
}

fn default_delivery_timeout() -> u64 {
    OrchestratorConfig::default().delivery_timeout.as_secs()
}

fn default_max_concurrent() -> usize {
    OrchestratorConfig::default().max_concurrent
}
