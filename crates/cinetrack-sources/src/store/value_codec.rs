//! Plain JSON <-> Firestore REST typed values.

use crate::error::StoreError;
use serde_json::{json, Map, Number, Value};

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // int64 travels as a decimal string
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let (kind, inner) = value
        .as_object()
        .and_then(|m| m.iter().next())
        .ok_or_else(|| StoreError::Malformed(format!("untyped value: {}", value)))?;

    match (kind.as_str(), inner) {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("integerValue", Value::String(s)) => s
            .parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .map_err(|_| StoreError::Malformed(format!("bad integerValue: {}", s))),
        ("integerValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::String(s)) => s
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| StoreError::Malformed(format!("bad doubleValue: {}", s))),
        ("stringValue", Value::String(s))
        | ("timestampValue", Value::String(s))
        | ("referenceValue", Value::String(s))
        | ("bytesValue", Value::String(s)) => Ok(Value::String(s.clone())),
        ("geoPointValue", point) => Ok(point.clone()),
        ("arrayValue", inner) => {
            let values = match inner.get("values").and_then(|v| v.as_array()) {
                Some(values) => values.iter().map(decode_value).collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(), // empty arrays omit `values`
            };
            Ok(Value::Array(values))
        }
        ("mapValue", inner) => {
            let fields = match inner.get("fields").and_then(|f| f.as_object()) {
                Some(fields) => decode_fields(fields)?,
                None => Map::new(),
            };
            Ok(Value::Object(fields))
        }
        (kind, _) => Err(StoreError::Malformed(format!("unsupported value type: {}", kind))),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, StoreError> {
    fields
        .iter()
        .map(|(key, value)| Ok::<_, StoreError>((key.clone(), decode_value(value)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_document_body() {
        let body = json!({
            "title": "X",
            "isExternal": true,
            "runtime": 120,
            "score": 7.5,
            "posterUrl": null,
            "movieIds": ["1", "2"]
        });
        let encoded = encode_fields(body.as_object().unwrap());
        assert_eq!(encoded["title"], json!({"stringValue": "X"}));
        assert_eq!(encoded["isExternal"], json!({"booleanValue": true}));
        assert_eq!(encoded["runtime"], json!({"integerValue": "120"}));
        assert_eq!(encoded["score"], json!({"doubleValue": 7.5}));
        assert_eq!(encoded["posterUrl"], json!({"nullValue": null}));
        assert_eq!(
            encoded["movieIds"],
            json!({"arrayValue": {"values": [{"stringValue": "1"}, {"stringValue": "2"}]}})
        );
    }

    #[test]
    fn test_decode_firestore_fields() {
        let fields = json!({
            "name": {"stringValue": "Favoritos"},
            "count": {"integerValue": "3"},
            "createdAt": {"timestampValue": "2024-05-01T10:00:00Z"},
            "movieIds": {"arrayValue": {}},
            "meta": {"mapValue": {"fields": {"ok": {"booleanValue": false}}}}
        });
        let decoded = decode_fields(fields.as_object().unwrap()).unwrap();
        assert_eq!(decoded["name"], "Favoritos");
        assert_eq!(decoded["count"], 3);
        assert_eq!(decoded["createdAt"], "2024-05-01T10:00:00Z");
        assert_eq!(decoded["movieIds"], json!([]));
        assert_eq!(decoded["meta"], json!({"ok": false}));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        assert!(decode_value(&json!({"weirdValue": 1})).is_err());
        assert!(decode_value(&json!("bare")).is_err());
    }
}
