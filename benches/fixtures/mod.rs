// Synthetic OTLP log payloads for benchmarking
//
// Builds the same log records as a protobuf ExportLogsServiceRequest and as canonical
// OTLP JSON Lines, clustered by service so zone maps have something to prune.

use otlpstore_proto::opentelemetry::proto::{
    collector::logs::v1::ExportLogsServiceRequest,
    common::v1::{any_value, AnyValue, InstrumentationScope, KeyValue},
    logs::v1::{LogRecord, ResourceLogs, ScopeLogs},
    resource::v1::Resource,
};
use prost::Message;

/// Fixed so runs are comparable.
pub const BASE_NANOS: u64 = 1_700_000_000_000_000_000;

pub const SERVICES: usize = 10;

/// Workload size presets
#[derive(Debug, Clone, Copy)]
pub enum WorkloadSize {
    Small,  // 10k log records
    Medium, // 100k log records
}

impl WorkloadSize {
    pub fn record_count(&self) -> usize {
        match self {
            WorkloadSize::Small => 10_000,
            WorkloadSize::Medium => 100_000,
        }
    }
}

fn service_name(idx: usize) -> String {
    format!("bench-service-{idx}")
}

fn severity(idx: usize) -> (i32, &'static str) {
    match idx % 5 {
        0 => (5, "DEBUG"),
        1 => (9, "INFO"),
        2 => (13, "WARN"),
        3 => (17, "ERROR"),
        _ => (21, "FATAL"),
    }
}

/// Records per service, services in order, timestamps 1ms apart across the whole set.
fn layout(size: WorkloadSize) -> impl Iterator<Item = (usize, std::ops::Range<usize>)> {
    let per_service = size.record_count() / SERVICES;
    (0..SERVICES).map(move |s| (s, s * per_service..(s + 1) * per_service))
}

pub fn generate_otlp_logs(size: WorkloadSize) -> ExportLogsServiceRequest {
    let resource_logs = layout(size)
        .map(|(service, records)| ResourceLogs {
            resource: Some(Resource {
                attributes: vec![
                    key_value("service.name", &service_name(service)),
                    key_value("host.name", &format!("host-{}", service % 3)),
                ],
                ..Default::default()
            }),
            scope_logs: vec![ScopeLogs {
                scope: Some(InstrumentationScope {
                    name: "benchmark-logger".to_string(),
                    version: "1.0.0".to_string(),
                    ..Default::default()
                }),
                log_records: records.map(generate_log_record).collect(),
                ..Default::default()
            }],
            ..Default::default()
        })
        .collect();

    ExportLogsServiceRequest { resource_logs }
}

fn generate_log_record(idx: usize) -> LogRecord {
    let (severity_number, severity_text) = severity(idx);
    LogRecord {
        time_unix_nano: BASE_NANOS + idx as u64 * 1_000_000,
        severity_number,
        severity_text: severity_text.to_string(),
        body: Some(AnyValue {
            value: Some(any_value::Value::StringValue(format!(
                "Benchmark log message #{idx}"
            ))),
        }),
        attributes: vec![key_value("thread.id", &(idx % 100).to_string())],
        ..Default::default()
    }
}

fn key_value(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue {
            value: Some(any_value::Value::StringValue(value.to_string())),
        }),
    }
}

pub fn to_protobuf(request: &ExportLogsServiceRequest) -> Vec<u8> {
    request.encode_to_vec()
}

/// The same records as JSON Lines, one document per service.
pub fn generate_json_lines(size: WorkloadSize) -> String {
    let mut out = String::new();
    for (service, records) in layout(size) {
        let log_records: Vec<_> = records
            .map(|idx| {
                let (severity_number, severity_text) = severity(idx);
                serde_json::json!({
                    "timeUnixNano": (BASE_NANOS + idx as u64 * 1_000_000).to_string(),
                    "severityNumber": severity_number,
                    "severityText": severity_text,
                    "body": {"stringValue": format!("Benchmark log message #{idx}")},
                    "attributes": [{"key": "thread.id", "value": {"stringValue": (idx % 100).to_string()}}]
                })
            })
            .collect();
        let doc = serde_json::json!({
            "resourceLogs": [{
                "resource": {"attributes": [
                    {"key": "service.name", "value": {"stringValue": service_name(service)}},
                    {"key": "host.name", "value": {"stringValue": format!("host-{}", service % 3)}}
                ]},
                "scopeLogs": [{"scope": {"name": "benchmark-logger", "version": "1.0.0"}, "logRecords": log_records}]
            }]
        });
        out.push_str(&doc.to_string());
        out.push('\n');
    }
    out
}
