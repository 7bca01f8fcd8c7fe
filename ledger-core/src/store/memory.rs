use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{merge_fields, Collection, Record, RecordStore, StoreError, StoreResult};

/// Process-local document store.
///
/// Used when no `DATABASE_URL` is configured and by the test suites.
/// Documents keep their insertion order per collection.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Record>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in a collection.
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn create(&self, collection: Collection, fields: Value) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(Record {
                id: id.clone(),
                fields,
            });
        Ok(id)
    }

    async fn update(&self, collection: Collection, id: &str, fields: Value) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(&collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        merge_fields(&mut record.fields, fields);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        if let Some(records) = self.collections.write().await.get_mut(&collection) {
            records.retain(|r| r.id != id);
        }
        Ok(())
    }
}
