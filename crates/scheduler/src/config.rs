use std::time::Duration;

/// Tuning for a single reminder pass.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound on one delivery attempt (default: 30 seconds).
    ///
    /// A fallback attempt gets its own budget.
    pub delivery_timeout: Duration,
    /// How many documents are evaluated at once (default: 4).
    pub max_concurrent: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            delivery_timeout: Duration::from_secs(30),
            max_concurrent: 4,
        }
    }
}

/// When the background loop fires passes.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Five-field cron expression (default: `0 8,20 * * *`, twice daily).
    pub cron: String,
    /// IANA timezone the cron expression is evaluated in (default: `UTC`).
    pub timezone: String,
    /// Run one pass immediately when the loop starts.
    pub run_on_startup: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: "0 8,20 * * *".to_owned(),
            timezone: "UTC".to_owned(),
            run_on_startup: false,
        }
    }
}
