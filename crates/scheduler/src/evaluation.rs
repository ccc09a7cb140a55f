use chrono::NaiveDate;
use docwatch_core::Channel;
use serde::Serialize;
use uuid::Uuid;

/// Where one document ended up after a pass evaluated it.
///
/// ```text
/// SKIP ─────────────────────────────── NotDue
/// DUE ── sent row exists ───────────── AlreadySent
///     └─ PENDING ── no destination ─── NoDestination
///                ├─ send failed ────── SendFailed
///                └─ SENT ───────────── Sent
/// ```
///
/// Every state except `Sent` leaves no sent row for the day, so the
/// document is reconsidered on the next pass. `StoreFailed` covers a
/// repository error part way through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    NotDue,
    /// A sent row for today already exists, or another writer claimed the
    /// day between our send and `mark_sent`.
    AlreadySent,
    NoDestination {
        reminder_id: Uuid,
    },
    SendFailed {
        reminder_id: Uuid,
        channel: Channel,
        reason: String,
    },
    Sent {
        reminder_id: Uuid,
        channel: Channel,
        fell_back: bool,
    },
    StoreFailed {
        reason: String,
    },
}

/// Summary of one reminder pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Calendar day the pass evaluated.
    pub date: NaiveDate,
    pub candidates: usize,
    pub not_due: usize,
    pub already_sent: usize,
    pub sent: usize,
    /// Sends that used email instead of the preferred channel.
    pub fallbacks: usize,
    pub failed: usize,
    pub no_destination: usize,
    pub store_errors: usize,
    /// Set when the pass could not load candidates and stopped early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl PassReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            candidates: 0,
            not_due: 0,
            already_sent: 0,
            sent: 0,
            fallbacks: 0,
            failed: 0,
            no_destination: 0,
            store_errors: 0,
            aborted: None,
        }
    }

    pub fn aborted(date: NaiveDate, reason: impl Into<String>) -> Self {
        Self {
            aborted: Some(reason.into()),
            ..Self::new(date)
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn record(&mut self, evaluation: &Evaluation) {
        match evaluation {
            Evaluation::NotDue => self.not_due += 1,
            Evaluation::AlreadySent => self.already_sent += 1,
            Evaluation::NoDestination { .. } => self.no_destination += 1,
            Evaluation::SendFailed { .. } => self.failed += 1,
            Evaluation::Sent { fell_back, .. } => {
                self.sent += 1;
                if *fell_back {
                    self.fallbacks += 1;
                }
            }
            Evaluation::StoreFailed { .. } => self.store_errors += 1,
        }
    }
}
