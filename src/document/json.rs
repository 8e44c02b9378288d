//! Conversions between documents and JSON
//!
//! Types JSON cannot carry use single-key extended forms:
//! `{"$binary": "<base64>"}`, `{"$date": "<rfc3339>"}`, `{"$minKey": 1}`,
//! `{"$maxKey": 1}` and `{"$undefined": true}`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value as Json};

use super::document::Document;
use super::value::Value;
use super::DocumentError;

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => from_json_object(map),
        }
    }
}

fn from_json_object(map: Map<String, Json>) -> Value {
    if map.len() == 1 {
        if let Some(special) = map.iter().next().and_then(|(k, v)| extended(k, v)) {
            return special;
        }
    }
    Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
}

fn extended(key: &str, value: &Json) -> Option<Value> {
    match key {
        "$binary" => value
            .as_str()
            .and_then(|s| STANDARD.decode(s).ok())
            .map(Value::Binary),
        "$date" => value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| Value::Timestamp(dt.with_timezone(&Utc))),
        "$minKey" => Some(Value::MinKey),
        "$maxKey" => Some(Value::MaxKey),
        "$undefined" => Some(Value::Undefined),
        _ => None,
    }
}

fn single(key: &str, value: Json) -> Json {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Json::Object(map)
}

impl Value {
    /// Converts to JSON. NaN and infinities become null.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::Number((*i).into()),
            Value::Double(d) => Number::from_f64(*d).map(Json::Number).unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Binary(b) => single("$binary", Json::String(STANDARD.encode(b))),
            Value::Timestamp(t) => single(
                "$date",
                Json::String(t.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(doc) => doc.to_json(),
            Value::MinKey => single("$minKey", Json::from(1)),
            Value::MaxKey => single("$maxKey", Json::from(1)),
            Value::Undefined => single("$undefined", Json::Bool(true)),
        }
    }
}

impl Document {
    pub fn to_json(&self) -> Json {
        Json::Object(
            self.iter()
                .map(|(k, v)| (k.to_string(), v.to_json()))
                .collect(),
        )
    }
}

impl TryFrom<Json> for Document {
    type Error = DocumentError;

    fn try_from(json: Json) -> Result<Self, Self::Error> {
        match Value::from(json) {
            Value::Object(doc) => Ok(doc),
            other => Err(DocumentError::NotAnObject(other.type_name())),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
