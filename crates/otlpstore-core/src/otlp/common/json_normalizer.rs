// JSON normalization for OTLP canonical JSON format
//
// Converts canonical OTLP JSON (camelCase keys, 64-bit integers as strings, hex ids,
// enum names) into the shape the serde derives on the prost structs expect
// (snake_case keys, real numbers, byte arrays, externally tagged oneofs).
// Missing fields are left missing: every message deserializes with defaults.

use std::mem;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use otlpstore_proto::opentelemetry::proto::logs::v1::SeverityNumber;
use otlpstore_proto::opentelemetry::proto::metrics::v1::AggregationTemporality;
use otlpstore_proto::opentelemetry::proto::trace::v1::{span::SpanKind, status::StatusCode};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

use super::field_names::otlp;
use crate::error::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericKind {
    U64,
    U32,
    I64,
    I32,
    F64,
}

/// Numeric fields and the integer width they must fit, keyed by snake_case name.
/// Array-valued fields (`bucket_counts`, `explicit_bounds`) apply to each element.
const NUMERIC_FIELDS: &[(&str, NumericKind)] = &[
    (otlp::TIME_UNIX_NANO, NumericKind::U64),
    (otlp::OBSERVED_TIME_UNIX_NANO, NumericKind::U64),
    (otlp::START_TIME_UNIX_NANO, NumericKind::U64),
    (otlp::END_TIME_UNIX_NANO, NumericKind::U64),
    (otlp::COUNT, NumericKind::U64),
    (otlp::ZERO_COUNT, NumericKind::U64),
    (otlp::BUCKET_COUNTS, NumericKind::U64),
    (otlp::FLAGS, NumericKind::U32),
    (otlp::DROPPED_ATTRIBUTES_COUNT, NumericKind::U32),
    (otlp::DROPPED_EVENTS_COUNT, NumericKind::U32),
    (otlp::DROPPED_LINKS_COUNT, NumericKind::U32),
    (otlp::INT_VALUE, NumericKind::I64),
    (otlp::AS_INT, NumericKind::I64),
    (otlp::SCALE, NumericKind::I32),
    (otlp::OFFSET, NumericKind::I32),
    (otlp::DOUBLE_VALUE, NumericKind::F64),
    (otlp::AS_DOUBLE, NumericKind::F64),
    (otlp::EXPLICIT_BOUNDS, NumericKind::F64),
    (otlp::SUM, NumericKind::F64),
    (otlp::MIN, NumericKind::F64),
    (otlp::MAX, NumericKind::F64),
    (otlp::ZERO_THRESHOLD, NumericKind::F64),
    (otlp::QUANTILE, NumericKind::F64),
];

const ENUM_FIELDS: &[&str] = &[
    otlp::KIND,
    otlp::CODE,
    otlp::SEVERITY_NUMBER,
    otlp::AGGREGATION_TEMPORALITY,
];

const ID_FIELDS: &[&str] = &[otlp::TRACE_ID, otlp::SPAN_ID, otlp::PARENT_SPAN_ID];

const ANYVALUE_VARIANTS: &[(&str, &str)] = &[
    (otlp::STRING_VALUE, "StringValue"),
    (otlp::BOOL_VALUE, "BoolValue"),
    (otlp::INT_VALUE, "IntValue"),
    (otlp::DOUBLE_VALUE, "DoubleValue"),
    (otlp::ARRAY_VALUE, "ArrayValue"),
    (otlp::KVLIST_VALUE, "KvlistValue"),
    (otlp::BYTES_VALUE, "BytesValue"),
];

const METRIC_DATA_VARIANTS: &[(&str, &str)] = &[
    (otlp::GAUGE, "Gauge"),
    (otlp::SUM, "Sum"),
    (otlp::HISTOGRAM, "Histogram"),
    (otlp::EXPONENTIAL_HISTOGRAM, "ExponentialHistogram"),
    (otlp::SUMMARY, "Summary"),
];

/// Normalize canonical OTLP JSON in place.
///
/// `key_hint` is the snake_case key under which `value` was found (the array key for
/// array elements). Errors name the offending field.
pub(crate) fn normalize_json_value(
    value: &mut JsonValue,
    key_hint: Option<&str>,
) -> Result<(), FieldError> {
    match value {
        JsonValue::Object(map) => normalize_object(map, key_hint),
        JsonValue::Array(items) => {
            for item in items.iter_mut() {
                normalize_json_value(item, key_hint)?;
            }
            Ok(())
        }
        JsonValue::Null | JsonValue::Bool(_) => Ok(()),
        JsonValue::String(_) | JsonValue::Number(_) => match key_hint {
            Some(key) => normalize_scalar(value, key),
            None => Ok(()),
        },
    }
}

fn normalize_object(
    map: &mut JsonMap<String, JsonValue>,
    key_hint: Option<&str>,
) -> Result<(), FieldError> {
    let original = mem::take(map);
    let mut any_value_variant = None;

    for (key, mut val) in original {
        let snake_key = if key.bytes().any(|b| b.is_ascii_uppercase()) {
            camel_to_snake_case(&key)
        } else {
            key
        };

        normalize_json_value(&mut val, Some(&snake_key))?;

        match ANYVALUE_VARIANTS.iter().find(|(name, _)| *name == snake_key) {
            Some((_, variant)) => any_value_variant = Some((*variant, val)),
            None => {
                map.insert(snake_key, val);
            }
        }
    }

    // AnyValue: {"stringValue": "x"} -> {"value": {"StringValue": "x"}}
    if let Some((variant, inner)) = any_value_variant {
        let mut tagged = JsonMap::with_capacity(1);
        tagged.insert(variant.to_string(), inner);
        map.insert(otlp::VALUE.to_string(), JsonValue::Object(tagged));
    }

    match key_hint {
        // Metric: {"gauge": {...}} -> {"data": {"Gauge": {...}}}
        Some(otlp::METRICS) => {
            for (field, variant) in METRIC_DATA_VARIANTS {
                if let Some(payload) = map.remove(*field) {
                    let mut tagged = JsonMap::with_capacity(1);
                    tagged.insert(variant.to_string(), payload);
                    map.insert(otlp::DATA.to_string(), JsonValue::Object(tagged));
                    break;
                }
            }
        }
        // Data points and exemplars: {"asDouble": 1.5} -> {"value": {"AsDouble": 1.5}}
        Some(otlp::DATA_POINTS) | Some(otlp::EXEMPLARS) => {
            let tagged = if let Some(v) = map.remove(otlp::AS_DOUBLE) {
                Some(("AsDouble", v))
            } else {
                map.remove(otlp::AS_INT).map(|v| ("AsInt", v))
            };
            if let Some((variant, v)) = tagged {
                let mut inner = JsonMap::with_capacity(1);
                inner.insert(variant.to_string(), v);
                map.insert(otlp::VALUE.to_string(), JsonValue::Object(inner));
            }
        }
        _ => {}
    }

    Ok(())
}

fn normalize_scalar(value: &mut JsonValue, key: &str) -> Result<(), FieldError> {
    if let Some((_, kind)) = NUMERIC_FIELDS.iter().find(|(name, _)| *name == key) {
        *value = coerce_number(key, value, *kind)?;
        return Ok(());
    }

    if ID_FIELDS.contains(&key) {
        if let JsonValue::String(s) = value {
            let bytes = decode_id(key, s)?;
            *value = bytes_to_json(bytes);
        }
        return Ok(());
    }

    if key == otlp::BYTES_VALUE {
        if let JsonValue::String(s) = value {
            let bytes = BASE64_STANDARD
                .decode(s.as_bytes())
                .map_err(|e| FieldError::new(key, format!("invalid base64: {e}")))?;
            *value = bytes_to_json(bytes);
        }
        return Ok(());
    }

    if ENUM_FIELDS.contains(&key) {
        if let JsonValue::String(s) = value {
            let parsed = match enum_number(key, s) {
                Some(number) => number,
                None => s.parse::<i32>().map_err(|_| {
                    FieldError::new(key, format!("unknown enum value '{s}'"))
                })?,
            };
            *value = JsonValue::Number(JsonNumber::from(parsed));
        }
    }

    Ok(())
}

fn enum_number(key: &str, name: &str) -> Option<i32> {
    match key {
        otlp::KIND => SpanKind::from_str_name(name).map(|k| k as i32),
        otlp::CODE => StatusCode::from_str_name(name).map(|c| c as i32),
        otlp::SEVERITY_NUMBER => SeverityNumber::from_str_name(name).map(|n| n as i32),
        otlp::AGGREGATION_TEMPORALITY => {
            AggregationTemporality::from_str_name(name).map(|t| t as i32)
        }
        _ => None,
    }
}

/// Parse a numeric field given as a JSON number or a decimal string, checking its range.
///
/// Integers are parsed as integers; large 64-bit values never pass through `f64`.
fn coerce_number(key: &str, value: &JsonValue, kind: NumericKind) -> Result<JsonValue, FieldError> {
    let out_of_range = || FieldError::new(key, format!("{value} does not fit {kind:?}"));
    let number = match (value, kind) {
        (JsonValue::Number(n), NumericKind::U64) => n.as_u64().map(JsonNumber::from),
        (JsonValue::Number(n), NumericKind::U32) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(JsonNumber::from),
        (JsonValue::Number(n), NumericKind::I64) => n.as_i64().map(JsonNumber::from),
        (JsonValue::Number(n), NumericKind::I32) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(JsonNumber::from),
        (JsonValue::Number(n), NumericKind::F64) => Some(n.clone()),
        (JsonValue::String(s), _) => return parse_numeric_string(key, s.trim(), kind),
        _ => {
            return Err(FieldError::new(
                key,
                format!("expected a number, found {value}"),
            ))
        }
    };
    number.map(JsonValue::Number).ok_or_else(out_of_range)
}

/// Parse a numeric field given as a string. Non-finite doubles keep their proto3 JSON
/// spelling (`"NaN"`, `"Infinity"`, `"-Infinity"`), which the proto structs accept.
fn parse_numeric_string(key: &str, s: &str, kind: NumericKind) -> Result<JsonValue, FieldError> {
    let invalid = |e: &dyn std::fmt::Display| {
        FieldError::new(key, format!("'{s}' is not a valid {kind:?}: {e}"))
    };
    let number = match kind {
        NumericKind::U64 => s.parse::<u64>().map(JsonNumber::from).map_err(|e| invalid(&e))?,
        NumericKind::U32 => s.parse::<u32>().map(JsonNumber::from).map_err(|e| invalid(&e))?,
        NumericKind::I64 => s.parse::<i64>().map(JsonNumber::from).map_err(|e| invalid(&e))?,
        NumericKind::I32 => s.parse::<i32>().map(JsonNumber::from).map_err(|e| invalid(&e))?,
        NumericKind::F64 => {
            let parsed = s.parse::<f64>().map_err(|e| invalid(&e))?;
            match JsonNumber::from_f64(parsed) {
                Some(number) => number,
                None => return Ok(JsonValue::String(non_finite_name(parsed).to_string())),
            }
        }
    };
    Ok(JsonValue::Number(number))
}

fn non_finite_name(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

/// Decode a hex (or, failing that, base64) trace/span id; the empty string is an empty id.
fn decode_id(key: &str, s: &str) -> Result<Vec<u8>, FieldError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    if s.len() % 2 == 0 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return hex::decode(s).map_err(|e| FieldError::new(key, format!("invalid hex id: {e}")));
    }
    BASE64_STANDARD
        .decode(s.as_bytes())
        .map_err(|_| FieldError::new(key, format!("'{s}' is neither hex nor base64")))
}

fn bytes_to_json(bytes: Vec<u8>) -> JsonValue {
    JsonValue::Array(
        bytes
            .into_iter()
            .map(|b| JsonValue::Number(JsonNumber::from(b)))
            .collect(),
    )
}

/// Convert camelCase to snake_case
fn camel_to_snake_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 4);
    let mut prev_underscore = false;
    for ch in input.chars() {
        if ch.is_ascii_uppercase() {
            if !result.is_empty() && !prev_underscore {
                result.push('_');
            }
            result.push(ch.to_ascii_lowercase());
            prev_underscore = false;
        } else {
            prev_underscore = ch == '_';
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(mut value: JsonValue) -> Result<JsonValue, FieldError> {
        normalize_json_value(&mut value, None)?;
        Ok(value)
    }

    #[test]
    fn camel_case_keys_become_snake_case() {
        assert_eq!(camel_to_snake_case("timeUnixNano"), "time_unix_nano");
        assert_eq!(camel_to_snake_case("already_snake"), "already_snake");
        assert_eq!(camel_to_snake_case("spanId"), "span_id");
    }

    #[test]
    fn string_timestamps_parse_without_precision_loss() {
        let out = normalize(json!({"startTimeUnixNano": "1700000000123456789"})).unwrap();
        assert_eq!(out["start_time_unix_nano"], json!(1_700_000_000_123_456_789u64));
    }

    #[test]
    fn non_numeric_timestamp_is_a_field_error() {
        let err = normalize(json!({"timeUnixNano": "yesterday"})).unwrap_err();
        assert_eq!(err.field, "time_unix_nano");
    }

    #[test]
    fn negative_counts_are_rejected() {
        let err = normalize(json!({"count": -1})).unwrap_err();
        assert_eq!(err.field, "count");
    }

    #[test]
    fn any_value_is_wrapped_as_tagged_oneof() {
        let out = normalize(json!({"key": "n", "value": {"intValue": "42"}})).unwrap();
        assert_eq!(out, json!({"key": "n", "value": {"value": {"IntValue": 42}}}));
    }

    #[test]
    fn ids_decode_from_hex_and_tolerate_empty() {
        let out = normalize(json!({"spanId": "0A0b", "parentSpanId": ""})).unwrap();
        assert_eq!(out["span_id"], json!([10, 11]));
        assert_eq!(out["parent_span_id"], json!([]));
        assert!(normalize(json!({"traceId": "zz!"})).is_err());
    }

    #[test]
    fn enum_names_map_to_numbers() {
        let out = normalize(json!({
            "kind": "SPAN_KIND_CLIENT",
            "status": {"code": "STATUS_CODE_ERROR"},
            "severityNumber": "SEVERITY_NUMBER_WARN"
        }))
        .unwrap();
        assert_eq!(out["kind"], json!(3));
        assert_eq!(out["status"]["code"], json!(2));
        assert_eq!(out["severity_number"], json!(13));
        assert!(normalize(json!({"kind": "SIDEWAYS"})).is_err());
    }

    #[test]
    fn metric_payload_and_point_values_are_tagged() {
        let mut metric = json!({
            "name": "cpu",
            "sum": {
                "aggregationTemporality": "AGGREGATION_TEMPORALITY_CUMULATIVE",
                "isMonotonic": true,
                "dataPoints": [{"asInt": "7", "timeUnixNano": "1000"}]
            }
        });
        normalize_json_value(&mut metric, Some(otlp::METRICS)).unwrap();
        let sum = &metric["data"]["Sum"];
        assert_eq!(sum["aggregation_temporality"], json!(2));
        assert_eq!(sum["data_points"][0]["value"], json!({"AsInt": 7}));
        assert_eq!(sum["data_points"][0]["time_unix_nano"], json!(1000));
    }

    #[test]
    fn non_finite_doubles_keep_their_json_spelling() {
        let out = normalize(json!({
            "asDouble": "NaN",
            "sum": "Infinity",
            "min": "-Infinity",
            "max": "2.5"
        }))
        .unwrap();
        assert_eq!(out["as_double"], json!("NaN"));
        assert_eq!(out["sum"], json!("Infinity"));
        assert_eq!(out["min"], json!("-Infinity"));
        assert_eq!(out["max"], json!(2.5));
        assert!(normalize(json!({"sum": "lots"})).is_err());
    }

    #[test]
    fn bucket_count_strings_parse_per_element() {
        let out = normalize(json!({"bucketCounts": ["1", 2, "3"]})).unwrap();
        assert_eq!(out["bucket_counts"], json!([1, 2, 3]));
        assert!(normalize(json!({"bucketCounts": ["x"]})).is_err());
    }
}
