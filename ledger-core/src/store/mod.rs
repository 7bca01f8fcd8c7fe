//! Record store port.
//!
//! The ledger never talks to a database directly. Everything goes through
//! [`RecordStore`], a small document-store contract keyed by collection name
//! and an opaque string identifier. Adapters live in the submodules.

pub mod memory;
pub mod postgres;
pub mod sanitize;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use sanitize::{sanitize, to_payload};

/// Document collections known to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Sellers,
    Purchases,
    /// Reserved. No operation reads or writes bills.
    Bills,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Sellers => "sellers",
            Collection::Purchases => "purchases",
            Collection::Bills => "bills",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw document as returned by [`RecordStore::list`].
///
/// The identifier is owned by the store and is never part of `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub fields: Value,
}

/// Errors raised by store adapters.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{collection} document {id} not found")]
    NotFound { collection: Collection, id: String },

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("malformed {collection} document {id}: {message}")]
    Decode {
        collection: Collection,
        id: String,
        message: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store contract.
///
/// Calls are awaited one at a time by the session; adapters do not need to
/// coordinate concurrent writers beyond being `Send + Sync`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every document of a collection in insertion order.
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Record>>;

    /// Stores a new document and returns the identifier assigned to it.
    async fn create(&self, collection: Collection, fields: Value) -> StoreResult<String>;

    /// Shallow-merges `fields` into an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] when `id` does not exist.
    async fn update(&self, collection: Collection, id: &str, fields: Value) -> StoreResult<()>;

    /// Removes a document. Removing a missing document is not an error.
    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()>;

    /// Cheap liveness probe used by the health endpoint.
    async fn ping(&self) -> StoreResult<()> {
        self.list(Collection::Bills).await.map(|_| ())
    }
}

/// Shallow merge used by adapters that implement `update` in memory.
pub(crate) fn merge_fields(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(patch)) => {
            for (key, value) in patch {
                existing.insert(key, value);
            }
        }
        (target, patch) => *target = patch,
    }
}
