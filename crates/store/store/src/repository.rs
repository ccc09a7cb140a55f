use async_trait::async_trait;
use chrono::NaiveDate;
use docwatch_core::{ActivityEntry, Document, DocumentCandidate, NewReminder, Reminder, UserProfile};
use uuid::Uuid;

use crate::error::StoreError;

/// Outcome of [`ReminderRepository::mark_sent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkSent {
    /// The row is now the sent reminder for its document and day.
    Marked,
    /// Another row (or this one, earlier) already holds the sent slot for
    /// this document and day. The row is left unsent.
    AlreadySent,
}

/// Read side for documents joined with owner and profile data.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// All `active` documents with owner email and profile preferences.
    async fn list_active_candidates(&self) -> Result<Vec<DocumentCandidate>, StoreError>;

    /// One document, only if it belongs to `user_id`. Any status.
    async fn find_candidate(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<DocumentCandidate>, StoreError>;
}

/// Reminder rows: at most one `sent` row per `(document_id, reminder_date)`.
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    async fn exists_sent(&self, document_id: Uuid, date: NaiveDate) -> Result<bool, StoreError>;

    /// Insert an unsent row and return its id. Never conflicts: repeated
    /// pending rows for the same day are allowed.
    async fn insert_pending(&self, reminder: &NewReminder) -> Result<Uuid, StoreError>;

    /// Atomically flip a pending row to sent.
    ///
    /// Returns [`MarkSent::AlreadySent`] instead of an error when the
    /// sent-once rule would be violated. Fails with
    /// [`StoreError::NotFound`] for an unknown id.
    async fn mark_sent(
        &self,
        reminder_id: Uuid,
        provider_message_id: Option<&str>,
    ) -> Result<MarkSent, StoreError>;

    /// Every row for a document, oldest first.
    async fn reminders_for_document(&self, document_id: Uuid) -> Result<Vec<Reminder>, StoreError>;
}

/// Append-only activity log.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), StoreError>;

    /// Most recent entries for a user, newest first.
    async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, StoreError>;
}

/// Write side for owners, profiles, and documents.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    async fn upsert_owner(&self, user_id: Uuid, email: &str) -> Result<(), StoreError>;

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;

    /// Insert or replace a document. The owner must exist.
    async fn save_document(&self, document: &Document) -> Result<(), StoreError>;

    /// Delete a document and, with it, all of its reminder rows.
    async fn delete_document(&self, document_id: Uuid) -> Result<bool, StoreError>;
}

/// Everything a backend provides; implemented for any type that has all
/// four parts.
pub trait ReminderStore:
    DocumentRepository + ReminderRepository + ActivityLog + DocumentWriter
{
}

impl<T> ReminderStore for T where
    T: DocumentRepository + ReminderRepository + ActivityLog + DocumentWriter
{
}
