//! Log rows: one per log record.

mod to_arrow;

use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use otlpstore_proto::opentelemetry::proto::collector::logs::v1::ExportLogsServiceRequest;
use otlpstore_proto::opentelemetry::proto::logs::v1::LogRecord;

use crate::otlp::common::codec::{
    any_value_to_string, attributes_to_map, id_to_hex, nanos_to_micros, Attributes,
};
use crate::otlp::common::context::{ResourceContext, ScopeContext};
use crate::row::TelemetryRow;
use crate::schema::logs::{logs_schema, SERVICE_NAME_COLUMN};
use crate::signal::SignalKind;

pub use to_arrow::LogBatchBuilder;

#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub resource: Arc<ResourceContext>,
    pub scope: Arc<ScopeContext>,
    /// Event time (observed time when unset), microseconds since epoch.
    pub timestamp: i64,
    pub trace_id: String,
    pub span_id: String,
    pub trace_flags: u32,
    pub severity_text: String,
    pub severity_number: i32,
    pub body: String,
    pub attributes: Attributes,
}

impl LogRow {
    fn from_record(
        record: &LogRecord,
        resource: &Arc<ResourceContext>,
        scope: &Arc<ScopeContext>,
    ) -> Self {
        let nanos = if record.time_unix_nano != 0 {
            record.time_unix_nano
        } else {
            record.observed_time_unix_nano
        };

        Self {
            resource: Arc::clone(resource),
            scope: Arc::clone(scope),
            timestamp: nanos_to_micros(nanos),
            trace_id: id_to_hex(&record.trace_id),
            span_id: id_to_hex(&record.span_id),
            trace_flags: record.flags,
            severity_text: record.severity_text.clone(),
            severity_number: record.severity_number,
            body: any_value_to_string(record.body.as_ref()),
            attributes: attributes_to_map(&record.attributes),
        }
    }
}

impl TelemetryRow for LogRow {
    type Request = ExportLogsServiceRequest;

    const SIGNAL: SignalKind = SignalKind::Logs;
    const SERVICE_NAME_COLUMN: usize = SERVICE_NAME_COLUMN;

    fn schema() -> SchemaRef {
        logs_schema()
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn service_name(&self) -> &str {
        &self.resource.service_name
    }

    fn extend_from_request(request: &Self::Request, rows: &mut Vec<Self>) {
        for resource_logs in &request.resource_logs {
            let resource =
                ResourceContext::extract(resource_logs.resource.as_ref(), &resource_logs.schema_url);
            for scope_logs in &resource_logs.scope_logs {
                let scope = ScopeContext::extract(scope_logs.scope.as_ref(), &scope_logs.schema_url);
                rows.extend(
                    scope_logs
                        .log_records
                        .iter()
                        .map(|record| LogRow::from_record(record, &resource, &scope)),
                );
            }
        }
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, ArrowError> {
        let mut builder = LogBatchBuilder::with_capacity(rows.len());
        for row in rows {
            builder.append(row)?;
        }
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, StringArray, TimestampMicrosecondArray};
    use otlpstore_proto::opentelemetry::proto::common::v1::{
        any_value, AnyValue, ArrayValue, InstrumentationScope, KeyValue,
    };
    use otlpstore_proto::opentelemetry::proto::logs::v1::{ResourceLogs, ScopeLogs};
    use otlpstore_proto::opentelemetry::proto::resource::v1::Resource;

    fn string_value(s: &str) -> Option<AnyValue> {
        Some(AnyValue {
            value: Some(any_value::Value::StringValue(s.to_string())),
        })
    }

    fn request_with(records: Vec<LogRecord>) -> ExportLogsServiceRequest {
        ExportLogsServiceRequest {
            resource_logs: vec![ResourceLogs {
                resource: Some(Resource {
                    attributes: vec![KeyValue {
                        key: "service.name".to_string(),
                        value: string_value("billing"),
                    }],
                    ..Default::default()
                }),
                scope_logs: vec![ScopeLogs {
                    scope: Some(InstrumentationScope {
                        name: "logger".to_string(),
                        version: "1.2".to_string(),
                        ..Default::default()
                    }),
                    log_records: records,
                    schema_url: "https://opentelemetry.io/schemas/1.21.0".to_string(),
                }],
                schema_url: String::new(),
            }],
        }
    }

    #[test]
    fn record_fields_are_normalized() {
        let record = LogRecord {
            time_unix_nano: 1_700_000_000_000_001_999,
            severity_number: 13,
            severity_text: "WARN".to_string(),
            body: string_value("disk almost full"),
            flags: 1,
            trace_id: vec![0x01; 16],
            ..Default::default()
        };

        let rows = LogRow::rows_from_request(&request_with(vec![record]));
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.timestamp, 1_700_000_000_000_002);
        assert_eq!(row.service_name(), "billing");
        assert_eq!(row.severity_text, "WARN");
        assert_eq!(row.severity_number, 13);
        assert_eq!(row.body, "disk almost full");
        assert_eq!(row.trace_flags, 1);
        assert_eq!(row.trace_id, "01".repeat(16));
        assert_eq!(row.span_id, "");
        assert_eq!(row.scope.name, "logger");
        assert_eq!(row.scope.schema_url, "https://opentelemetry.io/schemas/1.21.0");
    }

    #[test]
    fn observed_time_is_used_when_time_is_unset() {
        let record = LogRecord {
            observed_time_unix_nano: 5_000,
            ..Default::default()
        };
        let rows = LogRow::rows_from_request(&request_with(vec![record]));
        assert_eq!(rows[0].timestamp, 5);
    }

    #[test]
    fn structured_body_renders_as_json() {
        let record = LogRecord {
            body: Some(AnyValue {
                value: Some(any_value::Value::ArrayValue(ArrayValue {
                    values: vec![
                        AnyValue {
                            value: Some(any_value::Value::StringValue("a".to_string())),
                        },
                        AnyValue {
                            value: Some(any_value::Value::IntValue(1)),
                        },
                    ],
                })),
            }),
            ..Default::default()
        };
        let rows = LogRow::rows_from_request(&request_with(vec![record]));
        assert_eq!(rows[0].body, r#"["a",1]"#);
    }

    #[test]
    fn batch_columns_follow_schema() {
        let rows = LogRow::rows_from_request(&request_with(vec![
            LogRecord {
                time_unix_nano: 3_000,
                ..Default::default()
            },
            LogRecord {
                time_unix_nano: 4_000,
                ..Default::default()
            },
        ]));
        let batch = LogRow::to_record_batch(&rows).unwrap();
        assert_eq!(batch.schema(), logs_schema());
        assert_eq!(batch.num_rows(), 2);

        let ts = batch
            .column(0)
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .unwrap();
        assert_eq!(ts.value(1), 4);

        let service = batch
            .column(SERVICE_NAME_COLUMN)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(service.value(0), "billing");
        assert_eq!(service.null_count(), 0);
    }
}
