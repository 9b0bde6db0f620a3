use std::sync::{Arc, OnceLock};

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};

use super::{attribute_map_type, schema_metadata, utc_timestamp};
use crate::otlp::common::field_names::arrow as field;
use crate::signal::SignalKind;

pub const TIMESTAMP_COLUMN: usize = 0;
pub const SERVICE_NAME_COLUMN: usize = 6;

/// Cached schema for log rows. Timestamps are microseconds.
pub fn logs_schema() -> SchemaRef {
    static SCHEMA: OnceLock<SchemaRef> = OnceLock::new();
    Arc::clone(SCHEMA.get_or_init(|| Arc::new(build_schema())))
}

fn build_schema() -> Schema {
    let string = DataType::Utf8;
    let attributes = attribute_map_type();

    let fields = vec![
        Field::new(field::TIMESTAMP, utc_timestamp(TimeUnit::Microsecond), false),
        Field::new(field::TRACE_ID, string.clone(), false),
        Field::new(field::SPAN_ID, string.clone(), false),
        Field::new(field::TRACE_FLAGS, DataType::UInt32, false),
        Field::new(field::SEVERITY_TEXT, string.clone(), false),
        Field::new(field::SEVERITY_NUMBER, DataType::Int32, false),
        Field::new(field::SERVICE_NAME, string.clone(), false),
        Field::new(field::BODY, string.clone(), false),
        Field::new(field::RESOURCE_SCHEMA_URL, string.clone(), false),
        Field::new(field::RESOURCE_ATTRIBUTES, attributes.clone(), false),
        Field::new(field::SCOPE_SCHEMA_URL, string.clone(), false),
        Field::new(field::SCOPE_NAME, string.clone(), false),
        Field::new(field::SCOPE_VERSION, string, false),
        Field::new(field::SCOPE_ATTRIBUTES, attributes.clone(), false),
        Field::new(field::LOG_ATTRIBUTES, attributes, false),
    ];

    Schema::new_with_metadata(fields, schema_metadata(SignalKind::Logs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_layout() {
        let schema = logs_schema();
        assert_eq!(schema.fields().len(), 15);
        assert_eq!(schema.field(SERVICE_NAME_COLUMN).name(), field::SERVICE_NAME);
        assert_eq!(schema.field(7).name(), field::BODY);
        assert_eq!(schema.field(14).name(), field::LOG_ATTRIBUTES);
    }
}
