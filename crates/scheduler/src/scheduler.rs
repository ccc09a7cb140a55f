use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::ScheduleConfig;
use crate::error::SchedulerError;
use crate::orchestrator::ReminderOrchestrator;

/// Background loop that fires reminder passes on a cron schedule.
///
/// Passes run one at a time inside the loop, so two passes from the same
/// process never overlap. A shutdown signal received during a pass takes
/// effect once the pass finishes.
pub struct ReminderScheduler {
    orchestrator: Arc<ReminderOrchestrator>,
    cron: croner::Cron,
    timezone: chrono_tz::Tz,
    run_on_startup: bool,
    shutdown_rx: mpsc::Receiver<()>,
}

impl ReminderScheduler {
    pub fn new(
        orchestrator: Arc<ReminderOrchestrator>,
        config: &ScheduleConfig,
        shutdown_rx: mpsc::Receiver<()>,
    ) -> Result<Self, SchedulerError> {
        let cron = croner::Cron::new(&config.cron)
            .parse()
            .map_err(|e| SchedulerError::InvalidCron(format!("{}: {e}", config.cron)))?;
        let timezone = config
            .timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| SchedulerError::InvalidTimezone(config.timezone.clone()))?;

        let scheduler = Self {
            orchestrator,
            cron,
            timezone,
            run_on_startup: config.run_on_startup,
            shutdown_rx,
        };
        if scheduler.next_run_after(&Utc::now()).is_none() {
            return Err(SchedulerError::NoFutureOccurrence);
        }
        Ok(scheduler)
    }

    /// Next time the schedule fires strictly after `after`.
    pub fn next_run_after(&self, after: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local = after.with_timezone(&self.timezone);
        self.cron
            .find_next_occurrence(&local, false)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Run until a shutdown signal arrives or the sender is dropped.
    pub async fn run(&mut self) {
        info!(timezone = %self.timezone, "reminder scheduler starting");

        if self.run_on_startup {
            self.run_pass().await;
        }

        loop {
            let now = Utc::now();
            let Some(next) = self.next_run_after(&now) else {
                error!("reminder schedule has no future occurrences, stopping");
                break;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            debug!(%next, "next reminder pass scheduled");

            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!("reminder scheduler received shutdown signal");
                    break;
                }
                () = tokio::time::sleep(wait) => {
                    self.run_pass().await;
                }
            }
        }

        info!("reminder scheduler stopped");
    }

    async fn run_pass(&self) {
        let report = self.orchestrator.run_scheduled_pass().await;
        if report.is_aborted() {
            error!(reason = ?report.aborted, "scheduled reminder pass aborted");
        }
    }
}
