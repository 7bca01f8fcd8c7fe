use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::store::{InMemoryStore, PgStore, RecordStore};

/// Create a Postgres connection pool for `database_url`.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Picks the record store for this process.
///
/// With `DATABASE_URL` set the Postgres store is used (schema created on
/// first start); otherwise documents live in memory.
pub async fn open_store(config: &Config) -> Result<Arc<dyn RecordStore>, sqlx::Error> {
    match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.max_connections).await?;
            let store = PgStore::new(pool);
            store.ensure_schema().await?;
            info!("Using Postgres document store");
            Ok(Arc::new(store))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory document store");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
