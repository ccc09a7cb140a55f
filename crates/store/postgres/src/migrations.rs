use sqlx::PgPool;

use crate::config::PostgresConfig;

/// Create tables and indexes if they do not exist.
///
/// Safe to run on every start. The partial unique index on reminders is what
/// makes `mark_sent` atomic: a second sent row for the same document and
/// day fails with a unique violation.
pub async fn run_migrations(pool: &PgPool, config: &PostgresConfig) -> Result<(), sqlx::Error> {
    let users = config.users_table();
    let profiles = config.profiles_table();
    let documents = config.documents_table();
    let reminders = config.reminders_table();
    let activity = config.activity_table();
    let prefix = &config.table_prefix;

    let statements = [
        format!(
            "CREATE TABLE IF NOT EXISTS {users} (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {profiles} (
                user_id UUID PRIMARY KEY REFERENCES {users} (id) ON DELETE CASCADE,
                phone_number TEXT,
                business_name TEXT,
                role TEXT,
                preferred_reminder_channel TEXT NOT NULL DEFAULT 'whatsapp',
                reminder_frequency TEXT NOT NULL DEFAULT '30_days',
                reminder_time TIME NOT NULL DEFAULT '09:00',
                two_factor_enabled BOOLEAN NOT NULL DEFAULT FALSE,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {documents} (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL REFERENCES {users} (id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                document_type TEXT,
                expiration_date DATE NOT NULL,
                renewal_period_days INTEGER,
                is_critical BOOLEAN NOT NULL DEFAULT FALSE,
                status TEXT NOT NULL DEFAULT 'active',
                last_renewed_date DATE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{prefix}documents_status ON {documents} (status)"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {reminders} (
                id UUID PRIMARY KEY,
                document_id UUID NOT NULL REFERENCES {documents} (id) ON DELETE CASCADE,
                user_id UUID NOT NULL,
                reminder_date DATE NOT NULL,
                reminder_type TEXT NOT NULL,
                sent BOOLEAN NOT NULL DEFAULT FALSE,
                provider_message_id TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_{prefix}reminders_sent_once \
             ON {reminders} (document_id, reminder_date) WHERE sent"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {activity} (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL,
                action_type TEXT NOT NULL,
                description TEXT NOT NULL,
                related_document_id UUID,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{prefix}activity_user_time ON {activity} (user_id, created_at DESC)"
        ),
    ];

    for stmt in &statements {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}
