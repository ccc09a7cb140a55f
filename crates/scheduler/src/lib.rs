//! The reminder engine.
//!
//! [`ReminderOrchestrator`] evaluates every active document once per pass:
//! it asks the policy whether a reminder is due, guards against a second
//! send on the same day, and hands delivery to the [`Dispatcher`], which
//! picks the channel and falls back to email. [`ReminderScheduler`] fires
//! passes on a cron schedule until shutdown.

pub mod builder;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod orchestrator;
pub mod scheduler;

pub use builder::OrchestratorBuilder;
pub use config::{OrchestratorConfig, ScheduleConfig};
pub use dispatch::{DeliveryOutcome, Dispatcher, Route};
pub use error::SchedulerError;
pub use evaluation::{Evaluation, PassReport};
pub use metrics::{MetricsSnapshot, SchedulerMetrics};
pub use orchestrator::ReminderOrchestrator;
pub use scheduler::ReminderScheduler;
