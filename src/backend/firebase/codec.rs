// SPDX-License-Identifier: MPL-2.0

//! Conversion between plain JSON bodies and Firestore's typed REST values.

use crate::backend::{BackendError, Document};
use serde_json::{Map, Value, json};

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_map(map) } }),
    }
}

fn encode_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

/// Encode a document body; only JSON objects are valid documents.
pub fn encode_fields(data: &Value) -> Result<Value, BackendError> {
    match data {
        Value::Object(map) => Ok(Value::Object(encode_map(map))),
        other => Err(BackendError::InvalidResponse(format!(
            "document body must be an object, got {}",
            other
        ))),
    }
}

pub fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "doubleValue" => inner.clone(),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(decode_fields(inner.get("fields"))),
        _ => Value::Null,
    }
}

fn decode_fields(fields: Option<&Value>) -> Map<String, Value> {
    fields
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(k, v)| (k.clone(), decode_value(v)))
                .collect()
        })
        .unwrap_or_default()
}

/// Decode a REST document resource (`name`, `fields`, ...).
pub fn decode_document(resource: &Value) -> Result<Document, BackendError> {
    let name = resource
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::InvalidResponse("document without name".to_string()))?;
    let id = name.rsplit('/').next().unwrap_or(name);

    Ok(Document::new(
        id,
        Value::Object(decode_fields(resource.get("fields"))),
    ))
}
