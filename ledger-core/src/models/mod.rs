pub mod purchase;
pub mod seller;

pub use purchase::{Purchase, PurchaseLine};
pub use seller::{Item, ItemDraft, Seller, SellerDraft};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::store::{Collection, Record, StoreError, StoreResult};

/// Decodes a raw store document into a typed record.
///
/// The store keeps identifiers outside the document body, so the record id
/// is injected under `id` before deserializing. Missing optional fields fall
/// back to the serde defaults declared on each model.
pub fn decode<T: DeserializeOwned>(collection: Collection, record: Record) -> StoreResult<T> {
    let Record { id, fields } = record;
    let mut fields = match fields {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            return Err(StoreError::Decode {
                collection,
                id,
                message: format!("expected an object, found {}", other),
            })
        }
    };
    fields.insert("id".to_string(), Value::String(id.clone()));

    serde_json::from_value(Value::Object(fields)).map_err(|e| StoreError::Decode {
        collection,
        id,
        message: e.to_string(),
    })
}

/// Decodes every document of a listing, failing on the first malformed one.
pub fn decode_all<T: DeserializeOwned>(
    collection: Collection,
    records: Vec<Record>,
) -> StoreResult<Vec<T>> {
    records
        .into_iter()
        .map(|record| decode(collection, record))
        .collect()
}
