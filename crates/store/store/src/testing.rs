//! Backend-agnostic conformance suite.
//!
//! Call [`run_conformance_tests`] from a backend's test module with a fresh
//! store. Every check uses its own owner and documents, so a store that is
//! shared with other data still passes.

use chrono::{Duration, NaiveDate};
use docwatch_core::{
    ActivityAction, ActivityEntry, Channel, Document, DocumentStatus, Frequency, NewReminder,
    ReminderTier, UserProfile,
};
use uuid::Uuid;

use crate::error::StoreError;
use crate::repository::{MarkSent, ReminderStore};

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).unwrap_or_default() + Duration::days(offset)
}

async fn owner<S: ReminderStore + ?Sized>(store: &S) -> Result<Uuid, StoreError> {
    let user_id = Uuid::new_v4();
    store
        .upsert_owner(user_id, &format!("{}@example.com", user_id.simple()))
        .await?;
    Ok(user_id)
}

async fn document<S: ReminderStore + ?Sized>(
    store: &S,
    user_id: Uuid,
    title: &str,
    status: DocumentStatus,
) -> Result<Document, StoreError> {
    let doc = Document::new(user_id, title, day(7)).with_status(status);
    store.save_document(&doc).await?;
    Ok(doc)
}

fn pending(doc: &Document, date: NaiveDate) -> NewReminder {
    NewReminder {
        document_id: doc.id,
        user_id: doc.user_id,
        reminder_date: date,
        reminder_type: ReminderTier::ExpiresWeek,
    }
}

/// Run the full conformance suite against `store`.
pub async fn run_conformance_tests<S: ReminderStore + ?Sized>(store: &S) -> Result<(), StoreError> {
    test_only_active_documents_are_candidates(store).await?;
    test_candidate_joins_owner_and_profile(store).await?;
    test_candidate_without_profile(store).await?;
    test_find_candidate_checks_owner(store).await?;
    test_pending_rows_may_repeat(store).await?;
    test_mark_sent_once_per_day(store).await?;
    test_sent_slot_is_per_day(store).await?;
    test_mark_sent_unknown_id(store).await?;
    test_provider_message_id_is_stored(store).await?;
    test_activity_log_newest_first(store).await?;
    test_delete_cascades_reminders(store).await?;
    Ok(())
}

async fn test_only_active_documents_are_candidates<S: ReminderStore + ?Sized>(
    store: &S,
) -> Result<(), StoreError> {
    let user_id = owner(store).await?;
    let active = document(store, user_id, "active", DocumentStatus::Active).await?;
    let renewed = document(store, user_id, "renewed", DocumentStatus::Renewed).await?;
    let cancelled = document(store, user_id, "cancelled", DocumentStatus::Cancelled).await?;

    let ids: Vec<Uuid> = store
        .list_active_candidates()
        .await?
        .into_iter()
        .map(|c| c.document_id)
        .collect();
    assert!(ids.contains(&active.id), "active document must be a candidate");
    assert!(!ids.contains(&renewed.id), "renewed document must not be a candidate");
    assert!(!ids.contains(&cancelled.id), "cancelled document must not be a candidate");
    Ok(())
}

async fn test_candidate_joins_owner_and_profile<S: ReminderStore + ?Sized>(
    store: &S,
) -> Result<(), StoreError> {
    let user_id = owner(store).await?;
    store
        .upsert_profile(
            &UserProfile::new(user_id)
                .with_phone("+91 88516 70050")
                .with_channel(Channel::Sms)
                .with_frequency(Frequency::SevenDays),
        )
        .await?;
    let doc = Document::new(user_id, "Trade Licence", day(7)).with_critical(true);
    store.save_document(&doc).await?;

    let candidate = store
        .find_candidate(doc.id, user_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(doc.id.to_string()))?;
    assert_eq!(candidate.title, "Trade Licence");
    assert_eq!(candidate.expiration_date, day(7));
    assert!(candidate.is_critical);
    assert_eq!(
        candidate.email.as_deref(),
        Some(format!("{}@example.com", user_id.simple()).as_str())
    );
    assert_eq!(candidate.phone_number.as_deref(), Some("+91 88516 70050"));
    assert_eq!(candidate.preferred_channel, Some(Channel::Sms));
    assert_eq!(candidate.frequency, Some(Frequency::SevenDays));
    Ok(())
}

async fn test_candidate_without_profile<S: ReminderStore + ?Sized>(
    store: &S,
) -> Result<(), StoreError> {
    let user_id = owner(store).await?;
    let doc = document(store, user_id, "no profile", DocumentStatus::Active).await?;

    let candidate = store
        .list_active_candidates()
        .await?
        .into_iter()
        .find(|c| c.document_id == doc.id)
        .ok_or_else(|| StoreError::NotFound(doc.id.to_string()))?;
    assert!(candidate.phone_number.is_none());
    assert!(candidate.preferred_channel.is_none());
    assert!(candidate.frequency.is_none());
    Ok(())
}

async fn test_find_candidate_checks_owner<S: ReminderStore + ?Sized>(
    store: &S,
) -> Result<(), StoreError> {
    let user_id = owner(store).await?;
    let stranger = owner(store).await?;
    let doc = document(store, user_id, "owned", DocumentStatus::Renewed).await?;

    assert!(
        store.find_candidate(doc.id, user_id).await?.is_some(),
        "owner lookup returns the document regardless of status"
    );
    assert!(store.find_candidate(doc.id, stranger).await?.is_none());
    assert!(store.find_candidate(Uuid::new_v4(), user_id).await?.is_none());
    Ok(())
}

async fn test_pending_rows_may_repeat<S: ReminderStore + ?Sized>(
    store: &S,
) -> Result<(), StoreError> {
    let user_id = owner(store).await?;
    let doc = document(store, user_id, "retry", DocumentStatus::Active).await?;

    let first = store.insert_pending(&pending(&doc, day(0))).await?;
    let second = store.insert_pending(&pending(&doc, day(0))).await?;
    assert_ne!(first, second);

    let rows = store.reminders_for_document(doc.id).await?;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| !r.sent));
    assert!(!store.exists_sent(doc.id, day(0)).await?);
    Ok(())
}

async fn test_mark_sent_once_per_day<S: ReminderStore + ?Sized>(
    store: &S,
) -> Result<(), StoreError> {
    let user_id = owner(store).await?;
    let doc = document(store, user_id, "dedup", DocumentStatus::Active).await?;

    let first = store.insert_pending(&pending(&doc, day(0))).await?;
    let second = store.insert_pending(&pending(&doc, day(0))).await?;

    assert_eq!(store.mark_sent(first, None).await?, MarkSent::Marked);
    assert!(store.exists_sent(doc.id, day(0)).await?);

    assert_eq!(
        store.mark_sent(second, None).await?,
        MarkSent::AlreadySent,
        "a second row for the same day must not become sent"
    );
    assert_eq!(
        store.mark_sent(first, None).await?,
        MarkSent::AlreadySent,
        "re-marking the sent row reports it as already sent"
    );

    let rows = store.reminders_for_document(doc.id).await?;
    assert_eq!(rows.iter().filter(|r| r.sent).count(), 1);
    Ok(())
}

async fn test_sent_slot_is_per_day<S: ReminderStore + ?Sized>(
    store: &S,
) -> Result<(), StoreError> {
    let user_id = owner(store).await?;
    let doc = document(store, user_id, "daily", DocumentStatus::Active).await?;

    let today = store.insert_pending(&pending(&doc, day(0))).await?;
    let tomorrow = store.insert_pending(&pending(&doc, day(1))).await?;
    assert_eq!(store.mark_sent(today, None).await?, MarkSent::Marked);
    assert_eq!(store.mark_sent(tomorrow, None).await?, MarkSent::Marked);
    assert!(store.exists_sent(doc.id, day(0)).await?);
    assert!(store.exists_sent(doc.id, day(1)).await?);
    assert!(!store.exists_sent(doc.id, day(2)).await?);
    Ok(())
}

async fn test_mark_sent_unknown_id<S: ReminderStore + ?Sized>(
    store: &S,
) -> Result<(), StoreError> {
    let result = store.mark_sent(Uuid::new_v4(), None).await;
    assert!(
        matches!(result, Err(StoreError::NotFound(_))),
        "unknown reminder id must be NotFound"
    );
    Ok(())
}

async fn test_provider_message_id_is_stored<S: ReminderStore + ?Sized>(
    store: &S,
) -> Result<(), StoreError> {
    let user_id = owner(store).await?;
    let doc = document(store, user_id, "receipt", DocumentStatus::Active).await?;

    let id = store.insert_pending(&pending(&doc, day(0))).await?;
    store.mark_sent(id, Some("wamid.123")).await?;

    let rows = store.reminders_for_document(doc.id).await?;
    let row = rows
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    assert!(row.sent);
    assert_eq!(row.provider_message_id.as_deref(), Some("wamid.123"));
    assert_eq!(row.reminder_type, ReminderTier::ExpiresWeek);
    assert_eq!(row.reminder_date, day(0));
    Ok(())
}

async fn test_activity_log_newest_first<S: ReminderStore + ?Sized>(
    store: &S,
) -> Result<(), StoreError> {
    let user_id = owner(store).await?;
    let doc_id = Uuid::new_v4();

    let mut older = ActivityEntry::new(user_id, ActivityAction::DocumentCreated, "created");
    older.created_at -= Duration::minutes(5);
    let newer = ActivityEntry::new(user_id, ActivityAction::ReminderSent, "sent").for_document(doc_id);
    store.record(&older).await?;
    store.record(&newer).await?;

    let entries = store.recent_for_user(user_id, 10).await?;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, newer.id);
    assert_eq!(entries[0].action_type, ActivityAction::ReminderSent);
    assert_eq!(entries[0].related_document_id, Some(doc_id));
    assert_eq!(entries[1].id, older.id);

    assert_eq!(store.recent_for_user(user_id, 1).await?.len(), 1);
    Ok(())
}

async fn test_delete_cascades_reminders<S: ReminderStore + ?Sized>(
    store: &S,
) -> Result<(), StoreError> {
    let user_id = owner(store).await?;
    let doc = document(store, user_id, "doomed", DocumentStatus::Active).await?;
    store.insert_pending(&pending(&doc, day(0))).await?;

    assert!(store.delete_document(doc.id).await?);
    assert!(store.reminders_for_document(doc.id).await?.is_empty());
    assert!(store.find_candidate(doc.id, user_id).await?.is_none());
    assert!(!store.delete_document(doc.id).await?);
    Ok(())
}
