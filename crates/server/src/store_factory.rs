use std::sync::Arc;

use docwatch_store::ReminderStore;
use docwatch_store_memory::MemoryStore;
#[cfg(feature = "postgres")]
use docwatch_store_postgres::{PostgresConfig, PostgresStore};

use crate::config::StoreConfig;
use crate::error::ServerError;

/// Create the configured store. The Postgres backend runs its migrations
/// on connect.
#[allow(clippy::unused_async)]
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn ReminderStore>, ServerError> {
    let store: Arc<dyn ReminderStore> = match config.backend.as_str() {
        "memory" => Arc::new(MemoryStore::new()),
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = config.url.as_deref().ok_or_else(|| {
                ServerError::Config("postgres store requires [store] url".into())
            })?;
            let defaults = PostgresConfig::default();
            let pg_config = PostgresConfig {
                url: crate::config::resolve_secret(url)?,
                pool_size: config.pool_size.unwrap_or(defaults.pool_size),
                schema: config.schema.clone().unwrap_or(defaults.schema),
                table_prefix: config.table_prefix.clone().unwrap_or(defaults.table_prefix),
            };
            Arc::new(PostgresStore::new(pg_config).await?)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unsupported store backend: {other}"
            )));
        }
    };

    tracing::info!(backend = %config.backend, "store initialized");
    Ok(store)
}
