use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use docwatch_core::policy::is_due_in;
use docwatch_core::{
    ActivityAction, ActivityEntry, DocumentCandidate, NewReminder, classify_urgency,
    days_until_expiry,
};
use docwatch_provider::{ReminderMessage, TransportRegistry};
use docwatch_store::{ActivityLog, DocumentRepository, MarkSent, ReminderRepository};

use crate::config::OrchestratorConfig;
use crate::dispatch::{DeliveryOutcome, Dispatcher, Route};
use crate::evaluation::{Evaluation, PassReport};
use crate::metrics::SchedulerMetrics;

/// Runs reminder passes and manual test sends.
///
/// Reads documents and profiles; writes only reminder rows and activity
/// entries. Nothing returned from here is an error: per-document failures
/// are logged and tallied, and a pass that cannot load its candidates ends
/// with [`PassReport::aborted`].
pub struct ReminderOrchestrator {
    pub(crate) documents: Arc<dyn DocumentRepository>,
    pub(crate) reminders: Arc<dyn ReminderRepository>,
    pub(crate) activity: Arc<dyn ActivityLog>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) config: OrchestratorConfig,
    pub(crate) metrics: Arc<SchedulerMetrics>,
}

impl std::fmt::Debug for ReminderOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderOrchestrator")
            .field("dispatcher", &self.dispatcher)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn message_for(candidate: &DocumentCandidate, today: NaiveDate) -> ReminderMessage {
    ReminderMessage::new(candidate.title.clone(), candidate.expiration_date, today)
        .critical(candidate.is_critical)
}

impl ReminderOrchestrator {
    pub fn builder() -> crate::builder::OrchestratorBuilder {
        crate::builder::OrchestratorBuilder::new()
    }

    pub fn metrics(&self) -> &Arc<SchedulerMetrics> {
        &self.metrics
    }

    pub fn transports(&self) -> &Arc<TransportRegistry> {
        self.dispatcher.registry()
    }

    /// Run one pass for the current UTC calendar day.
    pub async fn run_scheduled_pass(&self) -> PassReport {
        self.run_pass_for(Utc::now().date_naive()).await
    }

    /// Run one pass treating `today` as the current calendar day.
    #[instrument(skip(self), fields(%today))]
    pub async fn run_pass_for(&self, today: NaiveDate) -> PassReport {
        self.metrics.increment_passes();

        let candidates = match self.documents.list_active_candidates().await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(error = %e, "failed to load reminder candidates, ending pass");
                self.metrics.increment_aborted();
                return PassReport::aborted(today, e.to_string());
            }
        };

        let mut report = PassReport::new(today);
        report.candidates = candidates.len();
        debug!(candidates = report.candidates, "evaluating active documents");

        let evaluations: Vec<Evaluation> = stream::iter(candidates)
            .map(|candidate| self.evaluate(candidate, today))
            .buffer_unordered(self.config.max_concurrent.max(1))
            .collect()
            .await;

        for evaluation in &evaluations {
            report.record(evaluation);
        }

        info!(
            candidates = report.candidates,
            sent = report.sent,
            already_sent = report.already_sent,
            failed = report.failed + report.no_destination + report.store_errors,
            fallbacks = report.fallbacks,
            "reminder pass complete"
        );
        report
    }

    #[instrument(skip_all, fields(document_id = %candidate.document_id))]
    async fn evaluate(&self, candidate: DocumentCandidate, today: NaiveDate) -> Evaluation {
        self.metrics.increment_evaluated();
        let evaluation = self.evaluate_inner(&candidate, today).await;
        self.observe(&evaluation);
        evaluation
    }

    async fn evaluate_inner(&self, candidate: &DocumentCandidate, today: NaiveDate) -> Evaluation {
        let days = days_until_expiry(today, candidate.expiration_date);
        if !is_due_in(days, candidate.frequency) {
            return Evaluation::NotDue;
        }

        match self.reminders.exists_sent(candidate.document_id, today).await {
            Ok(true) => {
                debug!("reminder already sent today");
                return Evaluation::AlreadySent;
            }
            Ok(false) => {}
            Err(e) => return store_failed("checking for a sent reminder", &e),
        }

        let tier = classify_urgency(days);
        let pending = NewReminder {
            document_id: candidate.document_id,
            user_id: candidate.user_id,
            reminder_date: today,
            reminder_type: tier,
        };
        let reminder_id = match self.reminders.insert_pending(&pending).await {
            Ok(id) => id,
            Err(e) => return store_failed("inserting the pending reminder", &e),
        };
        debug!(%reminder_id, %tier, days, "pending reminder created");

        let Some(route) = Route::resolve(candidate) else {
            warn!(
                %reminder_id,
                channel = ?candidate.preferred_channel,
                "no destination on file for the reminder channel, skipping"
            );
            return Evaluation::NoDestination { reminder_id };
        };

        let message = message_for(candidate, today);
        let (channel, message_id, fell_back) = match self.dispatcher.deliver(&route, &message).await
        {
            DeliveryOutcome::Delivered {
                channel,
                message_id,
                fell_back,
            } => (channel, message_id, fell_back),
            DeliveryOutcome::Failed { channel, reason } => {
                warn!(%reminder_id, %channel, %reason, "reminder not delivered, will retry next pass");
                return Evaluation::SendFailed {
                    reminder_id,
                    channel,
                    reason,
                };
            }
        };

        match self
            .reminders
            .mark_sent(reminder_id, message_id.as_deref())
            .await
        {
            Ok(MarkSent::Marked) => {}
            Ok(MarkSent::AlreadySent) => {
                warn!(%reminder_id, "another pass recorded a send for today first");
                return Evaluation::AlreadySent;
            }
            Err(e) => return store_failed("marking the reminder sent", &e),
        }

        let entry = ActivityEntry::new(
            candidate.user_id,
            ActivityAction::ReminderSent,
            format!(
                "Reminder sent for \"{}\" via {channel} ({tier})",
                candidate.title
            ),
        )
        .for_document(candidate.document_id);
        if let Err(e) = self.activity.record(&entry).await {
            warn!(error = %e, "failed to record reminder activity");
        }

        Evaluation::Sent {
            reminder_id,
            channel,
            fell_back,
        }
    }

    fn observe(&self, evaluation: &Evaluation) {
        match evaluation {
            Evaluation::NotDue => self.metrics.increment_skipped_not_due(),
            Evaluation::AlreadySent => self.metrics.increment_skipped_already_sent(),
            Evaluation::Sent { fell_back, .. } => {
                self.metrics.increment_sent();
                if *fell_back {
                    self.metrics.increment_fallbacks();
                }
            }
            Evaluation::NoDestination { .. }
            | Evaluation::SendFailed { .. }
            | Evaluation::StoreFailed { .. } => self.metrics.increment_failed(),
        }
    }

    /// Send a reminder for one document right now.
    ///
    /// Skips the due check and writes neither a reminder row nor an activity
    /// entry, so a test send does not count as the day's reminder. Whether
    /// it should is pending product confirmation. Returns `false` for an
    /// unknown `(user_id, document_id)` pair.
    #[instrument(skip(self))]
    pub async fn send_test_reminder(&self, user_id: Uuid, document_id: Uuid) -> bool {
        self.metrics.increment_test_sends();

        let candidate = match self.documents.find_candidate(document_id, user_id).await {
            Ok(Some(candidate)) => candidate,
            Ok(None) => {
                warn!("test reminder requested for an unknown document");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "failed to load document for test reminder");
                return false;
            }
        };

        let Some(route) = Route::resolve(&candidate) else {
            warn!("no destination on file for a test reminder");
            return false;
        };

        let message = message_for(&candidate, Utc::now().date_naive());
        self.dispatcher.deliver(&route, &message).await.is_delivered()
    }
}

fn store_failed(step: &str, e: &docwatch_store::StoreError) -> Evaluation {
    warn!(error = %e, "store error while {step}");
    Evaluation::StoreFailed {
        reason: format!("{step}: {e}"),
    }
}
