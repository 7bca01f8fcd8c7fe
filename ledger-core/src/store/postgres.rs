use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use crate::store::{Collection, Record, RecordStore, StoreError, StoreResult};

/// Postgres-backed document store.
///
/// All collections share one `documents` table; each document is a JSONB
/// blob keyed by `(collection, id)`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct DocumentRow {
    id: Uuid,
    data: Json<Value>,
}

impl DocumentRow {
    fn into_record(self) -> Record {
        Record {
            id: self.id.to_string(),
            fields: self.data.0,
        }
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `documents` table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection VARCHAR(32) NOT NULL,
                id UUID NOT NULL,
                data JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Document store schema is ready");
        Ok(())
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    error!("Document store query failed: {}", e);
    StoreError::Backend(e.to_string())
}

/// Identifiers that are not UUIDs cannot exist in this store.
fn parse_id(collection: Collection, id: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| StoreError::NotFound {
        collection,
        id: id.to_string(),
    })
}

#[async_trait]
impl RecordStore for PgStore {
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(DocumentRow::into_record).collect())
    }

    async fn create(&self, collection: Collection, fields: Value) -> StoreResult<String> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(fields))
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(id.to_string())
    }

    async fn update(&self, collection: Collection, id: &str, fields: Value) -> StoreResult<()> {
        let uuid = parse_id(collection, id)?;
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = data || $3
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(uuid)
        .bind(Json(fields))
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(());
        };

        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Test helper to create a test database pool.
    ///
    /// Needs `DATABASE_URL` pointing at a scratch database.
    async fn create_test_store() -> Result<PgStore, anyhow::Error> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL not set for tests"))?;

        let pool = PgPool::connect(&database_url).await?;
        let store = PgStore::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    #[test]
    fn non_uuid_ids_are_not_found() {
        let err = parse_id(Collection::Sellers, "abc").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_create_update_list_roundtrip() {
        let store = create_test_store().await.expect("Failed to create test store");

        let id = store
            .create(Collection::Purchases, json!({"billed": false, "date": "2024-01-02"}))
            .await
            .expect("Create should succeed");

        store
            .update(Collection::Purchases, &id, json!({"billed": true}))
            .await
            .expect("Update should succeed");

        let records = store.list(Collection::Purchases).await.expect("List should succeed");
        let record = records
            .iter()
            .find(|r| r.id == id)
            .expect("Created document should be listed");
        assert_eq!(record.fields["billed"], json!(true));
        assert_eq!(record.fields["date"], json!("2024-01-02"));

        store
            .delete(Collection::Purchases, &id)
            .await
            .expect("Delete should succeed");
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_update_missing_document() {
        let store = create_test_store().await.expect("Failed to create test store");
        let missing = Uuid::new_v4().to_string();

        let err = store
            .update(Collection::Sellers, &missing, json!({"name": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
