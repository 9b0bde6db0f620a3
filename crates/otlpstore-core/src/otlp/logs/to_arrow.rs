use std::sync::Arc;

use arrow::array::{
    ArrayRef, Int32Builder, RecordBatch, StringBuilder, TimestampMicrosecondBuilder, UInt32Builder,
};
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;

use super::LogRow;
use crate::otlp::common::builder_helpers::{
    append_attributes, attribute_map_builder, AttributeMapBuilder,
};
use crate::schema::logs::logs_schema;

/// Column-wise builder turning [`LogRow`]s into a record batch of the logs schema.
pub struct LogBatchBuilder {
    schema: SchemaRef,
    timestamp: TimestampMicrosecondBuilder,
    trace_id: StringBuilder,
    span_id: StringBuilder,
    trace_flags: UInt32Builder,
    severity_text: StringBuilder,
    severity_number: Int32Builder,
    service_name: StringBuilder,
    body: StringBuilder,
    resource_schema_url: StringBuilder,
    resource_attributes: AttributeMapBuilder,
    scope_schema_url: StringBuilder,
    scope_name: StringBuilder,
    scope_version: StringBuilder,
    scope_attributes: AttributeMapBuilder,
    log_attributes: AttributeMapBuilder,
}

impl LogBatchBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            schema: logs_schema(),
            timestamp: TimestampMicrosecondBuilder::with_capacity(capacity).with_timezone("UTC"),
            trace_id: StringBuilder::with_capacity(capacity, capacity * 32),
            span_id: StringBuilder::with_capacity(capacity, capacity * 16),
            trace_flags: UInt32Builder::with_capacity(capacity),
            severity_text: StringBuilder::new(),
            severity_number: Int32Builder::with_capacity(capacity),
            service_name: StringBuilder::new(),
            body: StringBuilder::new(),
            resource_schema_url: StringBuilder::new(),
            resource_attributes: attribute_map_builder(),
            scope_schema_url: StringBuilder::new(),
            scope_name: StringBuilder::new(),
            scope_version: StringBuilder::new(),
            scope_attributes: attribute_map_builder(),
            log_attributes: attribute_map_builder(),
        }
    }

    pub fn append(&mut self, row: &LogRow) -> Result<(), ArrowError> {
        self.timestamp.append_value(row.timestamp);
        self.trace_id.append_value(&row.trace_id);
        self.span_id.append_value(&row.span_id);
        self.trace_flags.append_value(row.trace_flags);
        self.severity_text.append_value(&row.severity_text);
        self.severity_number.append_value(row.severity_number);
        self.service_name.append_value(&row.resource.service_name);
        self.body.append_value(&row.body);
        self.resource_schema_url.append_value(&row.resource.schema_url);
        append_attributes(&mut self.resource_attributes, &row.resource.attributes)?;
        self.scope_schema_url.append_value(&row.scope.schema_url);
        self.scope_name.append_value(&row.scope.name);
        self.scope_version.append_value(&row.scope.version);
        append_attributes(&mut self.scope_attributes, &row.scope.attributes)?;
        append_attributes(&mut self.log_attributes, &row.attributes)
    }

    pub fn finish(mut self) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(self.timestamp.finish()),
            Arc::new(self.trace_id.finish()),
            Arc::new(self.span_id.finish()),
            Arc::new(self.trace_flags.finish()),
            Arc::new(self.severity_text.finish()),
            Arc::new(self.severity_number.finish()),
            Arc::new(self.service_name.finish()),
            Arc::new(self.body.finish()),
            Arc::new(self.resource_schema_url.finish()),
            Arc::new(self.resource_attributes.finish()),
            Arc::new(self.scope_schema_url.finish()),
            Arc::new(self.scope_name.finish()),
            Arc::new(self.scope_version.finish()),
            Arc::new(self.scope_attributes.finish()),
            Arc::new(self.log_attributes.finish()),
        ];
        RecordBatch::try_new(self.schema, columns)
    }
}
