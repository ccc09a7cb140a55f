use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use docwatch_core::{
    ActivityEntry, Document, DocumentCandidate, NewReminder, Reminder, UserProfile,
};
use docwatch_store::{
    ActivityLog, DocumentRepository, DocumentWriter, MarkSent, ReminderRepository, StoreError,
};

/// In-memory store backed by [`DashMap`]s.
///
/// The sent-once rule is enforced through a `(document_id, reminder_date)`
/// index claimed with the map's entry API, so concurrent `mark_sent` calls
/// for the same day cannot both win.
#[derive(Debug, Default)]
pub struct MemoryStore {
    owners: DashMap<Uuid, String>,
    profiles: DashMap<Uuid, UserProfile>,
    documents: DashMap<Uuid, Document>,
    reminders: DashMap<Uuid, Reminder>,
    sent_index: DashMap<(Uuid, NaiveDate), Uuid>,
    activity: DashMap<Uuid, ActivityEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn candidate(&self, doc: &Document) -> DocumentCandidate {
        let profile = self.profiles.get(&doc.user_id);
        DocumentCandidate {
            document_id: doc.id,
            user_id: doc.user_id,
            title: doc.title.clone(),
            expiration_date: doc.expiration_date,
            is_critical: doc.is_critical,
            email: self.owners.get(&doc.user_id).map(|e| e.value().clone()),
            phone_number: profile.as_ref().and_then(|p| p.phone_number.clone()),
            preferred_channel: profile.as_ref().map(|p| p.preferred_reminder_channel),
            frequency: profile.as_ref().map(|p| p.reminder_frequency),
        }
    }

    /// Number of activity entries across all users.
    pub fn activity_len(&self) -> usize {
        self.activity.len()
    }

    /// Number of reminder rows, sent or not.
    pub fn reminder_len(&self) -> usize {
        self.reminders.len()
    }
}

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn list_active_candidates(&self) -> Result<Vec<DocumentCandidate>, StoreError> {
        let mut candidates: Vec<DocumentCandidate> = self
            .documents
            .iter()
            .filter(|d| d.is_active())
            .map(|d| self.candidate(d.value()))
            .collect();
        candidates.sort_by_key(|c| (c.expiration_date, c.document_id));
        Ok(candidates)
    }

    async fn find_candidate(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<DocumentCandidate>, StoreError> {
        Ok(self
            .documents
            .get(&document_id)
            .filter(|d| d.user_id == user_id)
            .map(|d| self.candidate(d.value())))
    }
}

#[async_trait]
impl ReminderRepository for MemoryStore {
    async fn exists_sent(&self, document_id: Uuid, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self.sent_index.contains_key(&(document_id, date)))
    }

    async fn insert_pending(&self, reminder: &NewReminder) -> Result<Uuid, StoreError> {
        let row = Reminder::pending(reminder);
        let id = row.id;
        self.reminders.insert(id, row);
        Ok(id)
    }

    async fn mark_sent(
        &self,
        reminder_id: Uuid,
        provider_message_id: Option<&str>,
    ) -> Result<MarkSent, StoreError> {
        let key = self
            .reminders
            .get(&reminder_id)
            .map(|r| (r.document_id, r.reminder_date))
            .ok_or_else(|| StoreError::NotFound(format!("reminder {reminder_id}")))?;

        match self.sent_index.entry(key) {
            Entry::Occupied(_) => Ok(MarkSent::AlreadySent),
            Entry::Vacant(slot) => {
                let mut row = self
                    .reminders
                    .get_mut(&reminder_id)
                    .ok_or_else(|| StoreError::NotFound(format!("reminder {reminder_id}")))?;
                row.sent = true;
                row.provider_message_id = provider_message_id.map(str::to_owned);
                row.updated_at = Utc::now();
                slot.insert(reminder_id);
                Ok(MarkSent::Marked)
            }
        }
    }

    async fn reminders_for_document(&self, document_id: Uuid) -> Result<Vec<Reminder>, StoreError> {
        let mut rows: Vec<Reminder> = self
            .reminders
            .iter()
            .filter(|r| r.document_id == document_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }
}

#[async_trait]
impl ActivityLog for MemoryStore {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), StoreError> {
        self.activity.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, StoreError> {
        let mut entries: Vec<ActivityEntry> = self
            .activity
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[async_trait]
impl DocumentWriter for MemoryStore {
    async fn upsert_owner(&self, user_id: Uuid, email: &str) -> Result<(), StoreError> {
        self.owners.insert(user_id, email.to_owned());
        Ok(())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.profiles.insert(profile.user_id, profile.clone());
        Ok(())
    }

    async fn save_document(&self, document: &Document) -> Result<(), StoreError> {
        if !self.owners.contains_key(&document.user_id) {
            return Err(StoreError::NotFound(format!("owner {}", document.user_id)));
        }
        self.documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<bool, StoreError> {
        if self.documents.remove(&document_id).is_none() {
            return Ok(false);
        }
        self.reminders.retain(|_, r| r.document_id != document_id);
        self.sent_index.retain(|(doc, _), _| *doc != document_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use docwatch_core::ReminderTier;

    use super::*;

    #[tokio::test]
    async fn conformance() {
        let store = MemoryStore::new();
        docwatch_store::testing::run_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn concurrent_mark_sent_has_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let user_id = Uuid::new_v4();
        store.upsert_owner(user_id, "a@example.com").await.unwrap();
        let doc = Document::new(user_id, "Permit", NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        store.save_document(&doc).await.unwrap();

        let new = NewReminder {
            document_id: doc.id,
            user_id,
            reminder_date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            reminder_type: ReminderTier::ExpiresTwoWeeks,
        };
        let mut ids = Vec::new();
        for _ in 0..16 {
            ids.push(store.insert_pending(&new).await.unwrap());
        }

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.mark_sent(id, None).await.unwrap() })
            })
            .collect();

        let mut marked = 0;
        for handle in handles {
            if handle.await.unwrap() == MarkSent::Marked {
                marked += 1;
            }
        }
        assert_eq!(marked, 1);
    }

    #[tokio::test]
    async fn save_document_requires_owner() {
        let store = MemoryStore::new();
        let doc = Document::new(Uuid::new_v4(), "Orphan", NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        assert!(matches!(
            store.save_document(&doc).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
