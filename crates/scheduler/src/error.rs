use thiserror::Error;

/// Errors raised while assembling the orchestrator or its schedule.
///
/// A running pass never produces one of these; per-document and run-level
/// failures are reported through [`PassReport`](crate::PassReport).
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A required component was not supplied to the builder.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid cron expression: {0}")]
    InvalidCron(String),

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    /// The cron expression never fires again.
    #[error("cron expression has no future occurrences")]
    NoFutureOccurrence,
}
