use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use docwatch_core::{
    ActivityAction, ActivityEntry, Channel, Document, DocumentCandidate, Frequency, NewReminder,
    Reminder, ReminderTier, UserProfile,
};
use docwatch_store::{
    ActivityLog, DocumentRepository, DocumentWriter, MarkSent, ReminderRepository, StoreError,
};

use crate::config::PostgresConfig;
use crate::migrations;

/// PostgreSQL-backed store implementing every repository contract.
pub struct PostgresStore {
    pool: PgPool,
    config: Arc<PostgresConfig>,
}

impl PostgresStore {
    /// Connect, build the pool, and run migrations.
    pub async fn new(config: PostgresConfig) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::from_pool(pool, config).await
    }

    /// Wrap an existing pool. Runs migrations.
    pub async fn from_pool(pool: PgPool, config: PostgresConfig) -> Result<Self, StoreError> {
        migrations::run_migrations(&pool, &config)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))?;
        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    fn candidate_select(&self) -> String {
        let documents = self.config.documents_table();
        let users = self.config.users_table();
        let profiles = self.config.profiles_table();
        format!(
            "SELECT d.id AS document_id, d.user_id, d.title, d.expiration_date, d.is_critical, \
                    u.email, p.phone_number, p.preferred_reminder_channel, p.reminder_frequency \
             FROM {documents} d \
             LEFT JOIN {users} u ON u.id = d.user_id \
             LEFT JOIN {profiles} p ON p.user_id = d.user_id"
        )
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Connection(e.to_string())
        }
        other => StoreError::Backend(other.to_string()),
    }
}

#[derive(sqlx::FromRow)]
struct CandidateRow {
    document_id: Uuid,
    user_id: Uuid,
    title: String,
    expiration_date: NaiveDate,
    is_critical: bool,
    email: Option<String>,
    phone_number: Option<String>,
    preferred_reminder_channel: Option<String>,
    reminder_frequency: Option<String>,
}

impl From<CandidateRow> for DocumentCandidate {
    fn from(row: CandidateRow) -> Self {
        // Unrecognized preference strings fall back to the caller's defaults.
        Self {
            document_id: row.document_id,
            user_id: row.user_id,
            title: row.title,
            expiration_date: row.expiration_date,
            is_critical: row.is_critical,
            email: row.email,
            phone_number: row.phone_number,
            preferred_channel: row
                .preferred_reminder_channel
                .and_then(|c| c.parse::<Channel>().ok()),
            frequency: row
                .reminder_frequency
                .and_then(|f| f.parse::<Frequency>().ok()),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReminderRow {
    id: Uuid,
    document_id: Uuid,
    user_id: Uuid,
    reminder_date: NaiveDate,
    reminder_type: String,
    sent: bool,
    provider_message_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReminderRow> for Reminder {
    type Error = StoreError;

    fn try_from(row: ReminderRow) -> Result<Self, Self::Error> {
        let reminder_type: ReminderTier = row
            .reminder_type
            .parse()
            .map_err(|e: docwatch_core::CoreError| StoreError::Serialization(e.to_string()))?;
        Ok(Self {
            id: row.id,
            document_id: row.document_id,
            user_id: row.user_id,
            reminder_date: row.reminder_date,
            reminder_type,
            sent: row.sent,
            provider_message_id: row.provider_message_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    user_id: Uuid,
    action_type: String,
    description: String,
    related_document_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for ActivityEntry {
    type Error = StoreError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let action_type: ActivityAction = row
            .action_type
            .parse()
            .map_err(|e: docwatch_core::CoreError| StoreError::Serialization(e.to_string()))?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            action_type,
            description: row.description,
            related_document_id: row.related_document_id,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl DocumentRepository for PostgresStore {
    async fn list_active_candidates(&self) -> Result<Vec<DocumentCandidate>, StoreError> {
        let query = format!(
            "{} WHERE d.status = 'active' ORDER BY d.expiration_date, d.id",
            self.candidate_select()
        );
        let rows: Vec<CandidateRow> = sqlx::query_as(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(DocumentCandidate::from).collect())
    }

    async fn find_candidate(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<DocumentCandidate>, StoreError> {
        let query = format!(
            "{} WHERE d.id = $1 AND d.user_id = $2",
            self.candidate_select()
        );
        let row: Option<CandidateRow> = sqlx::query_as(&query)
            .bind(document_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.map(DocumentCandidate::from))
    }
}

#[async_trait]
impl ReminderRepository for PostgresStore {
    async fn exists_sent(&self, document_id: Uuid, date: NaiveDate) -> Result<bool, StoreError> {
        let table = self.config.reminders_table();
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM {table} WHERE document_id = $1 AND reminder_date = $2 AND sent)"
        );
        let (exists,): (bool,) = sqlx::query_as(&query)
            .bind(document_id)
            .bind(date)
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(exists)
    }

    async fn insert_pending(&self, reminder: &NewReminder) -> Result<Uuid, StoreError> {
        let table = self.config.reminders_table();
        let id = Uuid::new_v4();
        let query = format!(
            "INSERT INTO {table} (id, document_id, user_id, reminder_date, reminder_type, sent) \
             VALUES ($1, $2, $3, $4, $5, FALSE)"
        );
        sqlx::query(&query)
            .bind(id)
            .bind(reminder.document_id)
            .bind(reminder.user_id)
            .bind(reminder.reminder_date)
            .bind(reminder.reminder_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(id)
    }

    async fn mark_sent(
        &self,
        reminder_id: Uuid,
        provider_message_id: Option<&str>,
    ) -> Result<MarkSent, StoreError> {
        let table = self.config.reminders_table();
        let update = format!(
            "UPDATE {table} SET sent = TRUE, provider_message_id = $2, updated_at = NOW() \
             WHERE id = $1 AND NOT sent"
        );

        let result = sqlx::query(&update)
            .bind(reminder_id)
            .bind(provider_message_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => Ok(MarkSent::Marked),
            Ok(_) => {
                let exists = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)");
                let (found,): (bool,) = sqlx::query_as(&exists)
                    .bind(reminder_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(backend)?;
                if found {
                    Ok(MarkSent::AlreadySent)
                } else {
                    Err(StoreError::NotFound(format!("reminder {reminder_id}")))
                }
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                debug!(%reminder_id, "sent slot already taken for this document and day");
                Ok(MarkSent::AlreadySent)
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn reminders_for_document(&self, document_id: Uuid) -> Result<Vec<Reminder>, StoreError> {
        let table = self.config.reminders_table();
        let query = format!(
            "SELECT id, document_id, user_id, reminder_date, reminder_type, sent, \
                    provider_message_id, created_at, updated_at \
             FROM {table} WHERE document_id = $1 ORDER BY created_at, id"
        );
        let rows: Vec<ReminderRow> = sqlx::query_as(&query)
            .bind(document_id)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(Reminder::try_from).collect()
    }
}

#[async_trait]
impl ActivityLog for PostgresStore {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), StoreError> {
        let table = self.config.activity_table();
        let query = format!(
            "INSERT INTO {table} (id, user_id, action_type, description, related_document_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)"
        );
        sqlx::query(&query)
            .bind(entry.id)
            .bind(entry.user_id)
            .bind(entry.action_type.as_str())
            .bind(&entry.description)
            .bind(entry.related_document_id)
            .bind(entry.created_at)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, StoreError> {
        let table = self.config.activity_table();
        let query = format!(
            "SELECT id, user_id, action_type, description, related_document_id, created_at \
             FROM {table} WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<ActivityRow> = sqlx::query_as(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(ActivityEntry::try_from).collect()
    }
}

#[async_trait]
impl DocumentWriter for PostgresStore {
    async fn upsert_owner(&self, user_id: Uuid, email: &str) -> Result<(), StoreError> {
        let table = self.config.users_table();
        let query = format!(
            "INSERT INTO {table} (id, email) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email"
        );
        sqlx::query(&query)
            .bind(user_id)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let table = self.config.profiles_table();
        let query = format!(
            "INSERT INTO {table} (user_id, phone_number, business_name, role, \
                 preferred_reminder_channel, reminder_frequency, reminder_time, two_factor_enabled, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 phone_number = EXCLUDED.phone_number, \
                 business_name = EXCLUDED.business_name, \
                 role = EXCLUDED.role, \
                 preferred_reminder_channel = EXCLUDED.preferred_reminder_channel, \
                 reminder_frequency = EXCLUDED.reminder_frequency, \
                 reminder_time = EXCLUDED.reminder_time, \
                 two_factor_enabled = EXCLUDED.two_factor_enabled, \
                 updated_at = EXCLUDED.updated_at"
        );
        sqlx::query(&query)
            .bind(profile.user_id)
            .bind(&profile.phone_number)
            .bind(&profile.business_name)
            .bind(&profile.role)
            .bind(profile.preferred_reminder_channel.as_str())
            .bind(profile.reminder_frequency.as_str())
            .bind(profile.reminder_time)
            .bind(profile.two_factor_enabled)
            .bind(profile.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    StoreError::NotFound(format!("owner {}", profile.user_id))
                }
                other => backend(other),
            })?;
        Ok(())
    }

    async fn save_document(&self, document: &Document) -> Result<(), StoreError> {
        let table = self.config.documents_table();
        let query = format!(
            "INSERT INTO {table} (id, user_id, title, description, document_type, expiration_date, \
                 renewal_period_days, is_critical, status, last_renewed_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (id) DO UPDATE SET \
                 title = EXCLUDED.title, \
                 description = EXCLUDED.description, \
                 document_type = EXCLUDED.document_type, \
                 expiration_date = EXCLUDED.expiration_date, \
                 renewal_period_days = EXCLUDED.renewal_period_days, \
                 is_critical = EXCLUDED.is_critical, \
                 status = EXCLUDED.status, \
                 last_renewed_date = EXCLUDED.last_renewed_date, \
                 updated_at = EXCLUDED.updated_at"
        );
        sqlx::query(&query)
            .bind(document.id)
            .bind(document.user_id)
            .bind(&document.title)
            .bind(&document.description)
            .bind(&document.document_type)
            .bind(document.expiration_date)
            .bind(document.renewal_period_days)
            .bind(document.is_critical)
            .bind(document.status.as_str())
            .bind(document.last_renewed_date)
            .bind(document.created_at)
            .bind(document.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    StoreError::NotFound(format!("owner {}", document.user_id))
                }
                other => backend(other),
            })?;
        Ok(())
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<bool, StoreError> {
        let table = self.config.documents_table();
        let query = format!("DELETE FROM {table} WHERE id = $1");
        let result = sqlx::query(&query)
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}
