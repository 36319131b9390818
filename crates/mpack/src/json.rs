//! Conversion between [`Value`] and `serde_json::Value`.
//!
//! - Binary payloads become `"data:application/octet-stream;base64,<base64>"`.
//! - Extensions become `{"type": <id>, "data": "<data uri>"}`.
//! - Non-finite floats become `null`.
//! - Object keys that are not strings are rendered as their JSON text. Two
//!   keys that render the same fail with [`JsonError::DuplicateKey`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number, Value as Json};

use crate::{JsonError, Value};

pub const BIN_URI_START: &str = "data:application/octet-stream;base64,";

fn data_uri(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(BIN_URI_START.len() + bytes.len().div_ceil(3) * 4);
    out.push_str(BIN_URI_START);
    STANDARD.encode_string(bytes, &mut out);
    out
}

fn float(f: f64) -> Json {
    Number::from_f64(f).map_or(Json::Null, Json::Number)
}

pub fn to_json(value: &Value) -> Result<Json, JsonError> {
    let json = match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Float32(f) => float(*f as f64),
        Value::Float64(f) => float(*f),
        Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_) => {
            Json::from(value.int64_value())
        }
        Value::UInt8(_) | Value::UInt16(_) | Value::UInt32(_) | Value::UInt64(_) => {
            Json::from(value.uint64_value())
        }
        Value::String(s) => Json::String(String::from_utf8_lossy(s).into_owned()),
        Value::Binary(b) => Json::String(data_uri(b)),
        Value::Array(items) => {
            Json::Array(items.iter().map(to_json).collect::<Result<_, _>>()?)
        }
        Value::Object(map) => {
            let mut obj = Map::new();
            for (key, val) in map.iter() {
                let key = json_key(key)?;
                if obj.contains_key(&key) {
                    return Err(JsonError::DuplicateKey { key });
                }
                obj.insert(key, to_json(val)?);
            }
            Json::Object(obj)
        }
        Value::Extension(kind, data) => {
            let mut obj = Map::new();
            obj.insert("type".into(), Json::from(*kind));
            obj.insert("data".into(), Json::String(data_uri(data)));
            Json::Object(obj)
        }
    };
    Ok(json)
}

fn json_key(key: &Value) -> Result<String, JsonError> {
    match key {
        Value::String(s) => Ok(String::from_utf8_lossy(s).into_owned()),
        other => Ok(to_json(other)?.to_string()),
    }
}

pub fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int64(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt64(u)
            } else {
                Value::Float64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => items.iter().map(from_json).collect(),
        Json::Object(obj) => Value::object(obj.iter().map(|(k, v)| (k.as_str(), from_json(v)))),
    }
}
