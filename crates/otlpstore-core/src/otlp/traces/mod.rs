//! Trace rows: one per span.

mod to_arrow;

use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use otlpstore_proto::opentelemetry::proto::collector::trace::v1::ExportTraceServiceRequest;
use otlpstore_proto::opentelemetry::proto::trace::v1::{span::SpanKind, status::StatusCode, Span};

use crate::otlp::common::codec::{attributes_to_map, clamp_nanos, id_to_hex, Attributes};
use crate::otlp::common::context::{ResourceContext, ScopeContext};
use crate::row::TelemetryRow;
use crate::schema::traces::{traces_schema, SERVICE_NAME_COLUMN};
use crate::signal::SignalKind;

pub use to_arrow::TraceBatchBuilder;

#[derive(Debug, Clone, PartialEq)]
pub struct TraceRow {
    pub resource: Arc<ResourceContext>,
    pub scope: Arc<ScopeContext>,
    /// Span start, nanoseconds since epoch.
    pub timestamp: i64,
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: String,
    pub trace_state: String,
    pub span_name: String,
    pub span_kind: &'static str,
    pub attributes: Attributes,
    /// `end - start` in nanoseconds; 0 when the span ends before it starts.
    pub duration: i64,
    pub status_code: &'static str,
    pub status_message: String,
    pub events: Vec<SpanEvent>,
    pub links: Vec<SpanLink>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpanEvent {
    /// Nanoseconds since epoch.
    pub timestamp: i64,
    pub name: String,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpanLink {
    pub trace_id: String,
    pub span_id: String,
    pub trace_state: String,
    pub attributes: Attributes,
}

/// Short span kind name as stored in the `SpanKind` column.
pub fn span_kind_name(kind: i32) -> &'static str {
    match SpanKind::try_from(kind) {
        Ok(SpanKind::Internal) => "INTERNAL",
        Ok(SpanKind::Server) => "SERVER",
        Ok(SpanKind::Client) => "CLIENT",
        Ok(SpanKind::Producer) => "PRODUCER",
        Ok(SpanKind::Consumer) => "CONSUMER",
        Ok(SpanKind::Unspecified) | Err(_) => "UNSPECIFIED",
    }
}

/// Short status code name as stored in the `StatusCode` column.
pub fn status_code_name(code: i32) -> &'static str {
    match StatusCode::try_from(code) {
        Ok(StatusCode::Ok) => "OK",
        Ok(StatusCode::Error) => "ERROR",
        Ok(StatusCode::Unset) | Err(_) => "UNSET",
    }
}

impl TraceRow {
    fn from_span(span: &Span, resource: &Arc<ResourceContext>, scope: &Arc<ScopeContext>) -> Self {
        let (status_code, status_message) = match &span.status {
            Some(status) => (status_code_name(status.code), status.message.clone()),
            None => (status_code_name(0), String::new()),
        };
        let duration = span
            .end_time_unix_nano
            .saturating_sub(span.start_time_unix_nano);

        Self {
            resource: Arc::clone(resource),
            scope: Arc::clone(scope),
            timestamp: clamp_nanos(span.start_time_unix_nano),
            trace_id: id_to_hex(&span.trace_id),
            span_id: id_to_hex(&span.span_id),
            parent_span_id: id_to_hex(&span.parent_span_id),
            trace_state: span.trace_state.clone(),
            span_name: span.name.clone(),
            span_kind: span_kind_name(span.kind),
            attributes: attributes_to_map(&span.attributes),
            duration: clamp_nanos(duration),
            status_code,
            status_message,
            events: span
                .events
                .iter()
                .map(|event| SpanEvent {
                    timestamp: clamp_nanos(event.time_unix_nano),
                    name: event.name.clone(),
                    attributes: attributes_to_map(&event.attributes),
                })
                .collect(),
            links: span
                .links
                .iter()
                .map(|link| SpanLink {
                    trace_id: id_to_hex(&link.trace_id),
                    span_id: id_to_hex(&link.span_id),
                    trace_state: link.trace_state.clone(),
                    attributes: attributes_to_map(&link.attributes),
                })
                .collect(),
        }
    }
}

impl TelemetryRow for TraceRow {
    type Request = ExportTraceServiceRequest;

    const SIGNAL: SignalKind = SignalKind::Traces;
    const SERVICE_NAME_COLUMN: usize = SERVICE_NAME_COLUMN;

    fn schema() -> SchemaRef {
        traces_schema()
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn service_name(&self) -> &str {
        &self.resource.service_name
    }

    fn extend_from_request(request: &Self::Request, rows: &mut Vec<Self>) {
        for resource_spans in &request.resource_spans {
            let resource =
                ResourceContext::extract(resource_spans.resource.as_ref(), &resource_spans.schema_url);
            for scope_spans in &resource_spans.scope_spans {
                let scope = ScopeContext::extract(scope_spans.scope.as_ref(), &scope_spans.schema_url);
                rows.extend(
                    scope_spans
                        .spans
                        .iter()
                        .map(|span| TraceRow::from_span(span, &resource, &scope)),
                );
            }
        }
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, ArrowError> {
        let mut builder = TraceBatchBuilder::with_capacity(rows.len());
        for row in rows {
            builder.append(row)?;
        }
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otlpstore_proto::opentelemetry::proto::trace::v1::{
        span::Event, ResourceSpans, ScopeSpans, Status,
    };

    fn request_with(span: Span) -> ExportTraceServiceRequest {
        ExportTraceServiceRequest {
            resource_spans: vec![ResourceSpans {
                scope_spans: vec![ScopeSpans {
                    spans: vec![span],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn span_fields_are_normalized() {
        let span = Span {
            trace_id: vec![0xAA; 16],
            span_id: vec![0x0B; 8],
            name: "checkout".to_string(),
            kind: SpanKind::Client as i32,
            start_time_unix_nano: 1_000,
            end_time_unix_nano: 4_500,
            status: Some(Status {
                code: StatusCode::Error as i32,
                message: "boom".to_string(),
            }),
            events: vec![Event {
                time_unix_nano: 2_000,
                name: "retry".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let mut rows = Vec::new();
        TraceRow::extend_from_request(&request_with(span), &mut rows);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.trace_id, "aa".repeat(16));
        assert_eq!(row.span_id, "0b".repeat(8));
        assert_eq!(row.parent_span_id, "");
        assert_eq!(row.span_kind, "CLIENT");
        assert_eq!(row.duration, 3_500);
        assert_eq!(row.status_code, "ERROR");
        assert_eq!(row.status_message, "boom");
        assert_eq!(row.events[0].timestamp, 2_000);
        assert_eq!(row.service_name(), "unknown_service");
    }

    #[test]
    fn span_ending_before_start_has_zero_duration() {
        let span = Span {
            start_time_unix_nano: 10,
            end_time_unix_nano: 5,
            ..Default::default()
        };
        let mut rows = Vec::new();
        TraceRow::extend_from_request(&request_with(span), &mut rows);
        assert_eq!(rows[0].duration, 0);
        assert_eq!(rows[0].status_code, "UNSET");
        assert_eq!(rows[0].span_kind, "UNSPECIFIED");
    }

    #[test]
    fn batch_has_one_row_per_span() {
        let mut rows = Vec::new();
        TraceRow::extend_from_request(&request_with(Span::default()), &mut rows);
        TraceRow::extend_from_request(&request_with(Span::default()), &mut rows);
        let batch = TraceRow::to_record_batch(&rows).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema(), traces_schema());
    }
}
