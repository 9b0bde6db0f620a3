use std::sync::{Arc, OnceLock};

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};

use super::{attribute_map_type, list_of, schema_metadata, utc_timestamp};
use crate::otlp::common::field_names::arrow as field;
use crate::signal::SignalKind;

pub const TIMESTAMP_COLUMN: usize = 0;
pub const SERVICE_NAME_COLUMN: usize = 7;

/// Cached schema for trace rows. Timestamps are nanoseconds.
pub fn traces_schema() -> SchemaRef {
    static SCHEMA: OnceLock<SchemaRef> = OnceLock::new();
    Arc::clone(SCHEMA.get_or_init(|| Arc::new(build_schema())))
}

fn build_schema() -> Schema {
    let timestamp_ns = utc_timestamp(TimeUnit::Nanosecond);
    let string = DataType::Utf8;
    let attributes = attribute_map_type();

    let fields = vec![
        Field::new(field::TIMESTAMP, timestamp_ns.clone(), false),
        Field::new(field::TRACE_ID, string.clone(), false),
        Field::new(field::SPAN_ID, string.clone(), false),
        Field::new(field::PARENT_SPAN_ID, string.clone(), false),
        Field::new(field::TRACE_STATE, string.clone(), false),
        Field::new(field::SPAN_NAME, string.clone(), false),
        Field::new(field::SPAN_KIND, string.clone(), false),
        Field::new(field::SERVICE_NAME, string.clone(), false),
        Field::new(field::RESOURCE_ATTRIBUTES, attributes.clone(), false),
        Field::new(field::SCOPE_NAME, string.clone(), false),
        Field::new(field::SCOPE_VERSION, string.clone(), false),
        Field::new(field::SPAN_ATTRIBUTES, attributes.clone(), false),
        Field::new(field::DURATION, DataType::Int64, false),
        Field::new(field::STATUS_CODE, string.clone(), false),
        Field::new(field::STATUS_MESSAGE, string.clone(), false),
        Field::new(field::EVENTS_TIMESTAMP, list_of(timestamp_ns), false),
        Field::new(field::EVENTS_NAME, list_of(string.clone()), false),
        Field::new(field::EVENTS_ATTRIBUTES, list_of(attributes.clone()), false),
        Field::new(field::LINKS_TRACE_ID, list_of(string.clone()), false),
        Field::new(field::LINKS_SPAN_ID, list_of(string.clone()), false),
        Field::new(field::LINKS_TRACE_STATE, list_of(string), false),
        Field::new(field::LINKS_ATTRIBUTES, list_of(attributes), false),
    ];

    Schema::new_with_metadata(fields, schema_metadata(SignalKind::Traces))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_layout() {
        let schema = traces_schema();
        assert_eq!(schema.fields().len(), 22);

        assert_eq!(schema.field(TIMESTAMP_COLUMN).name(), field::TIMESTAMP);
        assert_eq!(schema.field(1).name(), field::TRACE_ID);
        assert_eq!(schema.field(SERVICE_NAME_COLUMN).name(), field::SERVICE_NAME);
        assert_eq!(schema.field(12).name(), field::DURATION);
        assert_eq!(schema.field(21).name(), field::LINKS_ATTRIBUTES);
        assert_eq!(
            schema.metadata().get("otlpstore.signal").map(String::as_str),
            Some("traces")
        );
    }
}
