//! Attribute/value codec: flattens OTLP `AnyValue` trees into strings and converts
//! nanosecond timestamps into the row schemas' timestamp units.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use otlpstore_proto::opentelemetry::proto::common::v1::{any_value, AnyValue, KeyValue};
use otlpstore_proto::opentelemetry::proto::resource::v1::Resource;
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

use super::field_names::semconv;

/// Placeholder used when a resource omits `service.name`.
pub const UNKNOWN_SERVICE_NAME: &str = "unknown_service";

/// Flattened attribute map. Keys are unique; the last duplicate wins.
pub type Attributes = BTreeMap<String, String>;

/// Flatten an OTLP key/value list into an [`Attributes`] map.
pub fn attributes_to_map(attributes: &[KeyValue]) -> Attributes {
    attributes
        .iter()
        .map(|kv| (kv.key.clone(), any_value_to_string(kv.value.as_ref())))
        .collect()
}

/// Render an `AnyValue` as a string.
///
/// Scalars render bare (`hello`, `42`, `true`, `1.5`); bytes render as base64;
/// arrays and key/value lists render as compact JSON (`["a",1]`, `{"k":"v"}`).
/// An absent or empty value renders as the empty string.
pub fn any_value_to_string(value: Option<&AnyValue>) -> String {
    match value.and_then(|v| v.value.as_ref()) {
        None => String::new(),
        Some(any_value::Value::StringValue(s)) => s.clone(),
        Some(any_value::Value::BoolValue(b)) => b.to_string(),
        Some(any_value::Value::IntValue(i)) => i.to_string(),
        Some(any_value::Value::DoubleValue(d)) => format_double(*d),
        Some(any_value::Value::BytesValue(bytes)) => BASE64_STANDARD.encode(bytes),
        Some(inner @ any_value::Value::ArrayValue(_))
        | Some(inner @ any_value::Value::KvlistValue(_)) => inner_to_json(inner).to_string(),
    }
}

/// Borrow the string payload of an `AnyValue`, if it holds one.
pub fn any_value_str(value: &AnyValue) -> Option<&str> {
    match value.value.as_ref()? {
        any_value::Value::StringValue(s) => Some(s.as_str()),
        _ => None,
    }
}

fn any_value_to_json(value: &AnyValue) -> JsonValue {
    value
        .value
        .as_ref()
        .map(inner_to_json)
        .unwrap_or(JsonValue::Null)
}

fn inner_to_json(value: &any_value::Value) -> JsonValue {
    match value {
        any_value::Value::StringValue(s) => JsonValue::String(s.clone()),
        any_value::Value::BoolValue(b) => JsonValue::Bool(*b),
        any_value::Value::IntValue(i) => JsonValue::Number(JsonNumber::from(*i)),
        any_value::Value::DoubleValue(d) => JsonNumber::from_f64(*d)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(d.to_string())),
        any_value::Value::BytesValue(bytes) => JsonValue::String(BASE64_STANDARD.encode(bytes)),
        any_value::Value::ArrayValue(array) => {
            JsonValue::Array(array.values.iter().map(any_value_to_json).collect())
        }
        any_value::Value::KvlistValue(list) => {
            let mut map = JsonMap::with_capacity(list.values.len());
            for entry in &list.values {
                let rendered = entry
                    .value
                    .as_ref()
                    .map(any_value_to_json)
                    .unwrap_or(JsonValue::Null);
                map.insert(entry.key.clone(), rendered);
            }
            JsonValue::Object(map)
        }
    }
}

fn format_double(value: f64) -> String {
    match JsonNumber::from_f64(value) {
        Some(number) => number.to_string(),
        None => value.to_string(),
    }
}

/// `service.name` from resource attributes, or [`UNKNOWN_SERVICE_NAME`].
pub fn service_name(resource: Option<&Resource>) -> String {
    resource
        .and_then(|r| {
            r.attributes
                .iter()
                .find(|kv| kv.key == semconv::SERVICE_NAME)
        })
        .and_then(|kv| kv.value.as_ref())
        .and_then(any_value_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_SERVICE_NAME)
        .to_string()
}

/// Lowercase hex rendering of a trace or span id; empty ids stay empty.
pub fn id_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Nanoseconds since epoch as a signed count, clamped to `i64::MAX`.
pub fn clamp_nanos(nanos: u64) -> i64 {
    i64::try_from(nanos).unwrap_or(i64::MAX)
}

/// Nanoseconds to microseconds, rounding half up and clamping to `i64::MAX`.
pub fn nanos_to_micros(nanos: u64) -> i64 {
    let rounded = nanos / 1_000 + u64::from(nanos % 1_000 >= 500);
    i64::try_from(rounded).unwrap_or(i64::MAX)
}
