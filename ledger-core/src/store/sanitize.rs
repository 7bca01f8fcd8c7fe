use serde::Serialize;
use serde_json::Value;

use crate::store::StoreError;

/// Recursively removes every key named `id` from an outgoing payload.
///
/// The store assigns and owns document identifiers, so they must never be
/// written as fields. Nested objects inside arrays are cleaned as well.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| key != "id")
                .map(|(key, value)| (key, sanitize(value)))
                .collect(),
        ),
        Value::Array(values) => Value::Array(values.into_iter().map(sanitize).collect()),
        other => other,
    }
}

/// Serializes a record for writing and strips identifier fields.
///
/// Dates and timestamps come out as ISO-8601 strings through chrono's serde
/// support; numbers, strings, booleans and arrays pass through untouched.
pub fn to_payload<T: Serialize>(record: &T) -> Result<Value, StoreError> {
    let value = serde_json::to_value(record)
        .map_err(|e| StoreError::Backend(format!("failed to encode payload: {}", e)))?;
    Ok(sanitize(value))
}
