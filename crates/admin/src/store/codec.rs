//! Conversion between plain JSON documents and Firestore's typed value
//! encoding.
//!
//! The Firestore REST API wraps every field in a type discriminator
//! (`stringValue`, `integerValue`, `mapValue`, ...). Model types in this
//! crate serialize to plain JSON, so the client converts at the wire
//! boundary in both directions. Integers travel as strings per the
//! Firestore wire format.

use serde_json::{Map, Value, json};

use super::StoreError;

/// Encode a plain JSON document into a Firestore `fields` map.
///
/// # Errors
///
/// Fails with [`StoreError::Corrupt`] if `doc` is not a JSON object.
pub fn to_fields(doc: &Value) -> Result<Map<String, Value>, StoreError> {
    let obj = doc
        .as_object()
        .ok_or_else(|| StoreError::Corrupt("document must be a JSON object".to_owned()))?;

    let mut fields = Map::with_capacity(obj.len());
    for (name, value) in obj {
        fields.insert(name.clone(), encode_value(value));
    }
    Ok(fields)
}

/// Decode a Firestore `fields` map back into a plain JSON object.
pub fn from_fields(fields: &Map<String, Value>) -> Result<Value, StoreError> {
    let mut obj = Map::with_capacity(fields.len());
    for (name, value) in fields {
        obj.insert(name.clone(), decode_value(value)?);
    }
    Ok(Value::Object(obj))
}

/// Encode one JSON value as a Firestore typed value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            // Firestore represents 64-bit integers as decimal strings.
            n.as_i64().map_or_else(
                || json!({ "doubleValue": n }),
                |i| json!({ "integerValue": i.to_string() }),
            )
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let mut fields = Map::with_capacity(map.len());
            for (name, v) in map {
                fields.insert(name.clone(), encode_value(v));
            }
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Decode one Firestore typed value into plain JSON.
///
/// # Errors
///
/// Fails with [`StoreError::Corrupt`] on unknown discriminators or
/// malformed integer strings.
pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let obj = value
        .as_object()
        .ok_or_else(|| corrupt("typed value must be an object", value))?;

    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| corrupt("typed value is empty", value))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(inner.clone()),
        "integerValue" => {
            let raw = inner
                .as_str()
                .map(str::to_owned)
                .or_else(|| inner.as_i64().map(|i| i.to_string()))
                .ok_or_else(|| corrupt("integerValue must be a string", value))?;
            let parsed: i64 = raw
                .parse()
                .map_err(|_| corrupt("integerValue is not an integer", value))?;
            Ok(json!(parsed))
        }
        "doubleValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" => Ok(inner.clone()),
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let decoded: Result<Vec<Value>, StoreError> = items.iter().map(decode_value).collect();
            Ok(Value::Array(decoded?))
        }
        "mapValue" => {
            let fields = inner.get("fields").and_then(Value::as_object);
            match fields {
                Some(fields) => from_fields(fields),
                None => Ok(Value::Object(Map::new())),
            }
        }
        other => Err(StoreError::Corrupt(format!(
            "unknown Firestore value kind: {other}"
        ))),
    }
}

fn corrupt(msg: &str, value: &Value) -> StoreError {
    StoreError::Corrupt(format!("{msg}: {value}"))
}
