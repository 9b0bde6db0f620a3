use std::sync::Arc;

use arrow::array::{
    ArrayRef, Int64Builder, ListBuilder, RecordBatch, StringBuilder, TimestampNanosecondBuilder,
};
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;

use super::TraceRow;
use crate::otlp::common::builder_helpers::{
    append_attributes, attribute_map_builder, AttributeMapBuilder,
};
use crate::schema::list_element;
use crate::schema::traces::traces_schema;

/// Column-wise builder turning [`TraceRow`]s into a record batch of the traces schema.
pub struct TraceBatchBuilder {
    schema: SchemaRef,
    timestamp: TimestampNanosecondBuilder,
    trace_id: StringBuilder,
    span_id: StringBuilder,
    parent_span_id: StringBuilder,
    trace_state: StringBuilder,
    span_name: StringBuilder,
    span_kind: StringBuilder,
    service_name: StringBuilder,
    resource_attributes: AttributeMapBuilder,
    scope_name: StringBuilder,
    scope_version: StringBuilder,
    span_attributes: AttributeMapBuilder,
    duration: Int64Builder,
    status_code: StringBuilder,
    status_message: StringBuilder,
    events_timestamp: ListBuilder<TimestampNanosecondBuilder>,
    events_name: ListBuilder<StringBuilder>,
    events_attributes: ListBuilder<AttributeMapBuilder>,
    links_trace_id: ListBuilder<StringBuilder>,
    links_span_id: ListBuilder<StringBuilder>,
    links_trace_state: ListBuilder<StringBuilder>,
    links_attributes: ListBuilder<AttributeMapBuilder>,
}

impl TraceBatchBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        let schema = traces_schema();
        let list_field = |idx: usize| list_element(schema.field(idx));

        Self {
            timestamp: TimestampNanosecondBuilder::with_capacity(capacity).with_timezone("UTC"),
            trace_id: StringBuilder::with_capacity(capacity, capacity * 32),
            span_id: StringBuilder::with_capacity(capacity, capacity * 16),
            parent_span_id: StringBuilder::with_capacity(capacity, capacity * 16),
            trace_state: StringBuilder::new(),
            span_name: StringBuilder::new(),
            span_kind: StringBuilder::new(),
            service_name: StringBuilder::new(),
            resource_attributes: attribute_map_builder(),
            scope_name: StringBuilder::new(),
            scope_version: StringBuilder::new(),
            span_attributes: attribute_map_builder(),
            duration: Int64Builder::with_capacity(capacity),
            status_code: StringBuilder::new(),
            status_message: StringBuilder::new(),
            events_timestamp: ListBuilder::new(TimestampNanosecondBuilder::new().with_timezone("UTC"))
                .with_field(list_field(15)),
            events_name: ListBuilder::new(StringBuilder::new()).with_field(list_field(16)),
            events_attributes: ListBuilder::new(attribute_map_builder()).with_field(list_field(17)),
            links_trace_id: ListBuilder::new(StringBuilder::new()).with_field(list_field(18)),
            links_span_id: ListBuilder::new(StringBuilder::new()).with_field(list_field(19)),
            links_trace_state: ListBuilder::new(StringBuilder::new()).with_field(list_field(20)),
            links_attributes: ListBuilder::new(attribute_map_builder()).with_field(list_field(21)),
            schema,
        }
    }

    pub fn append(&mut self, row: &TraceRow) -> Result<(), ArrowError> {
        self.timestamp.append_value(row.timestamp);
        self.trace_id.append_value(&row.trace_id);
        self.span_id.append_value(&row.span_id);
        self.parent_span_id.append_value(&row.parent_span_id);
        self.trace_state.append_value(&row.trace_state);
        self.span_name.append_value(&row.span_name);
        self.span_kind.append_value(row.span_kind);
        self.service_name.append_value(&row.resource.service_name);
        append_attributes(&mut self.resource_attributes, &row.resource.attributes)?;
        self.scope_name.append_value(&row.scope.name);
        self.scope_version.append_value(&row.scope.version);
        append_attributes(&mut self.span_attributes, &row.attributes)?;
        self.duration.append_value(row.duration);
        self.status_code.append_value(row.status_code);
        self.status_message.append_value(&row.status_message);

        for event in &row.events {
            self.events_timestamp.values().append_value(event.timestamp);
            self.events_name.values().append_value(&event.name);
            append_attributes(self.events_attributes.values(), &event.attributes)?;
        }
        self.events_timestamp.append(true);
        self.events_name.append(true);
        self.events_attributes.append(true);

        for link in &row.links {
            self.links_trace_id.values().append_value(&link.trace_id);
            self.links_span_id.values().append_value(&link.span_id);
            self.links_trace_state.values().append_value(&link.trace_state);
            append_attributes(self.links_attributes.values(), &link.attributes)?;
        }
        self.links_trace_id.append(true);
        self.links_span_id.append(true);
        self.links_trace_state.append(true);
        self.links_attributes.append(true);

        Ok(())
    }

    pub fn finish(mut self) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(self.timestamp.finish()),
            Arc::new(self.trace_id.finish()),
            Arc::new(self.span_id.finish()),
            Arc::new(self.parent_span_id.finish()),
            Arc::new(self.trace_state.finish()),
            Arc::new(self.span_name.finish()),
            Arc::new(self.span_kind.finish()),
            Arc::new(self.service_name.finish()),
            Arc::new(self.resource_attributes.finish()),
            Arc::new(self.scope_name.finish()),
            Arc::new(self.scope_version.finish()),
            Arc::new(self.span_attributes.finish()),
            Arc::new(self.duration.finish()),
            Arc::new(self.status_code.finish()),
            Arc::new(self.status_message.finish()),
            Arc::new(self.events_timestamp.finish()),
            Arc::new(self.events_name.finish()),
            Arc::new(self.events_attributes.finish()),
            Arc::new(self.links_trace_id.finish()),
            Arc::new(self.links_span_id.finish()),
            Arc::new(self.links_trace_state.finish()),
            Arc::new(self.links_attributes.finish()),
        ];
        RecordBatch::try_new(self.schema, columns)
    }
}
