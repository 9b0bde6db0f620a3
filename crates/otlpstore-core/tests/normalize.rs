use arrow::array::Array;
use otlpstore_core::otlp::common::codec::nanos_to_micros;
use otlpstore_core::schema::metrics::{PAYLOAD_COLUMNS, VALUE};
use otlpstore_core::{
    normalize, normalize_rows, ErrorKind, LogRow, MetricData, MetricRow, PayloadFormat,
    SignalKind, SignalRows, TelemetryRow, TraceRow,
};
use otlpstore_proto::opentelemetry::proto::collector::logs::v1::ExportLogsServiceRequest;
use otlpstore_proto::opentelemetry::proto::collector::metrics::v1::ExportMetricsServiceRequest;
use otlpstore_proto::opentelemetry::proto::collector::trace::v1::ExportTraceServiceRequest;
use otlpstore_proto::opentelemetry::proto::common::v1::{
    any_value, AnyValue, ArrayValue, InstrumentationScope, KeyValue, KeyValueList,
};
use otlpstore_proto::opentelemetry::proto::logs::v1::{LogRecord, ResourceLogs, ScopeLogs};
use otlpstore_proto::opentelemetry::proto::metrics::v1::{
    metric::Data, number_data_point, Histogram, HistogramDataPoint, Metric, NumberDataPoint,
    ResourceMetrics, ScopeMetrics, Sum,
};
use otlpstore_proto::opentelemetry::proto::resource::v1::Resource;
use otlpstore_proto::opentelemetry::proto::trace::v1::{
    span::{Event, Link},
    ResourceSpans, ScopeSpans, Span, Status,
};
use proptest::prelude::*;
use prost::Message;

const TRACE_JSON: &str = r#"{"resourceSpans":[{"resource":{"attributes":[{"key":"service.name","value":{"stringValue":"checkout"}},{"key":"host.cores","value":{"intValue":"8"}}]},"schemaUrl":"https://opentelemetry.io/schemas/1.21.0","scopeSpans":[{"scope":{"name":"io.test","version":"1.0"},"spans":[{"traceId":"5b8efff798038103d269b633813fc60c","spanId":"eee19b7ec3c1b174","parentSpanId":"eee19b7ec3c1b173","traceState":"k=v","name":"GET /","kind":"SPAN_KIND_SERVER","startTimeUnixNano":"1700000000000000123","endTimeUnixNano":"1700000000000005123","attributes":[{"key":"http.status","value":{"intValue":"200"}},{"key":"ok","value":{"boolValue":true}},{"key":"ratio","value":{"doubleValue":0.25}},{"key":"tags","value":{"arrayValue":{"values":[{"stringValue":"a"},{"stringValue":"b"}]}}}],"events":[{"timeUnixNano":"1700000000000001000","name":"retry","attributes":[{"key":"attempt","value":{"intValue":2}}]}],"links":[{"traceId":"0102030405060708090a0b0c0d0e0f10","spanId":"0102030405060708","traceState":"a=b"}],"status":{"code":2,"message":"bad"}}]}]}]}"#;

const LOGS_JSON: &str = r#"{"resourceLogs":[{"resource":{"attributes":[{"key":"service.name","value":{"stringValue":"billing"}}]},"scopeLogs":[{"scope":{"name":"app"},"logRecords":[{"timeUnixNano":"1700000000000001500","observedTimeUnixNano":"1700000000000009999","severityNumber":"SEVERITY_NUMBER_WARN","severityText":"WARN","body":{"kvlistValue":{"values":[{"key":"msg","value":{"stringValue":"low disk"}}]}},"traceId":"5b8efff798038103d269b633813fc60c","spanId":"eee19b7ec3c1b174","flags":1,"attributes":[{"key":"bytes","value":{"bytesValue":"AQID"}}]}]}]}]}"#;

const METRICS_JSON: &str = r#"{"resourceMetrics":[{"resource":{"attributes":[{"key":"service.name","value":{"stringValue":"api"}}]},"scopeMetrics":[{"scope":{"name":"meter"},"metrics":[{"name":"requests","unit":"1","sum":{"aggregationTemporality":"AGGREGATION_TEMPORALITY_CUMULATIVE","isMonotonic":true,"dataPoints":[{"timeUnixNano":"1700000000000000000","asInt":"42","attributes":[{"key":"route","value":{"stringValue":"/"}}]}]}},{"name":"latency","unit":"ms","histogram":{"aggregationTemporality":1,"dataPoints":[{"timeUnixNano":"1700000000000000000","count":"3","sum":6.5,"bucketCounts":["1","2"],"explicitBounds":[5.0],"min":1,"max":4.5}]}}]}]}]}"#;

fn kv(key: &str, value: any_value::Value) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue { value: Some(value) }),
    }
}

fn string(s: &str) -> any_value::Value {
    any_value::Value::StringValue(s.to_string())
}

fn resource(service: &str) -> Option<Resource> {
    Some(Resource {
        attributes: vec![kv("service.name", string(service))],
        ..Default::default()
    })
}

fn scope(name: &str, version: &str) -> Option<InstrumentationScope> {
    Some(InstrumentationScope {
        name: name.to_string(),
        version: version.to_string(),
        ..Default::default()
    })
}

fn hex_id(s: &str) -> Vec<u8> {
    hex::decode(s).unwrap()
}

fn trace_request() -> ExportTraceServiceRequest {
    let mut resource = resource("checkout").unwrap();
    resource
        .attributes
        .push(kv("host.cores", any_value::Value::IntValue(8)));

    ExportTraceServiceRequest {
        resource_spans: vec![ResourceSpans {
            resource: Some(resource),
            schema_url: "https://opentelemetry.io/schemas/1.21.0".to_string(),
            scope_spans: vec![ScopeSpans {
                scope: scope("io.test", "1.0"),
                spans: vec![Span {
                    trace_id: hex_id("5b8efff798038103d269b633813fc60c"),
                    span_id: hex_id("eee19b7ec3c1b174"),
                    parent_span_id: hex_id("eee19b7ec3c1b173"),
                    trace_state: "k=v".to_string(),
                    name: "GET /".to_string(),
                    kind: 2,
                    start_time_unix_nano: 1_700_000_000_000_000_123,
                    end_time_unix_nano: 1_700_000_000_000_005_123,
                    attributes: vec![
                        kv("http.status", any_value::Value::IntValue(200)),
                        kv("ok", any_value::Value::BoolValue(true)),
                        kv("ratio", any_value::Value::DoubleValue(0.25)),
                        kv(
                            "tags",
                            any_value::Value::ArrayValue(ArrayValue {
                                values: vec![
                                    AnyValue {
                                        value: Some(string("a")),
                                    },
                                    AnyValue {
                                        value: Some(string("b")),
                                    },
                                ],
                            }),
                        ),
                    ],
                    events: vec![Event {
                        time_unix_nano: 1_700_000_000_000_001_000,
                        name: "retry".to_string(),
                        attributes: vec![kv("attempt", any_value::Value::IntValue(2))],
                        ..Default::default()
                    }],
                    links: vec![Link {
                        trace_id: hex_id("0102030405060708090a0b0c0d0e0f10"),
                        span_id: hex_id("0102030405060708"),
                        trace_state: "a=b".to_string(),
                        ..Default::default()
                    }],
                    status: Some(Status {
                        code: 2,
                        message: "bad".to_string(),
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }],
    }
}

fn logs_request() -> ExportLogsServiceRequest {
    ExportLogsServiceRequest {
        resource_logs: vec![ResourceLogs {
            resource: resource("billing"),
            scope_logs: vec![ScopeLogs {
                scope: scope("app", ""),
                log_records: vec![LogRecord {
                    time_unix_nano: 1_700_000_000_000_001_500,
                    observed_time_unix_nano: 1_700_000_000_000_009_999,
                    severity_number: 13,
                    severity_text: "WARN".to_string(),
                    body: Some(AnyValue {
                        value: Some(any_value::Value::KvlistValue(KeyValueList {
                            values: vec![kv("msg", string("low disk"))],
                        })),
                    }),
                    trace_id: hex_id("5b8efff798038103d269b633813fc60c"),
                    span_id: hex_id("eee19b7ec3c1b174"),
                    flags: 1,
                    attributes: vec![kv("bytes", any_value::Value::BytesValue(vec![1, 2, 3]))],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

fn metrics_request() -> ExportMetricsServiceRequest {
    ExportMetricsServiceRequest {
        resource_metrics: vec![ResourceMetrics {
            resource: resource("api"),
            scope_metrics: vec![ScopeMetrics {
                scope: scope("meter", ""),
                metrics: vec![
                    Metric {
                        name: "requests".to_string(),
                        unit: "1".to_string(),
                        data: Some(Data::Sum(Sum {
                            aggregation_temporality: 2,
                            is_monotonic: true,
                            data_points: vec![NumberDataPoint {
                                time_unix_nano: 1_700_000_000_000_000_000,
                                value: Some(number_data_point::Value::AsInt(42)),
                                attributes: vec![kv("route", string("/"))],
                                ..Default::default()
                            }],
                        })),
                        ..Default::default()
                    },
                    Metric {
                        name: "latency".to_string(),
                        unit: "ms".to_string(),
                        data: Some(Data::Histogram(Histogram {
                            aggregation_temporality: 1,
                            data_points: vec![HistogramDataPoint {
                                time_unix_nano: 1_700_000_000_000_000_000,
                                count: 3,
                                sum: Some(6.5),
                                bucket_counts: vec![1, 2],
                                explicit_bounds: vec![5.0],
                                min: Some(1.0),
                                max: Some(4.5),
                                ..Default::default()
                            }],
                        })),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

fn rows_of<R: TelemetryRow>(payload: &[u8], expected: PayloadFormat) -> Vec<R> {
    let normalized = normalize_rows::<R>(payload, None).unwrap();
    assert_eq!(normalized.format, expected);
    normalized.into_rows().unwrap()
}

#[test]
fn traces_json_and_protobuf_agree() {
    let from_json: Vec<TraceRow> = rows_of(TRACE_JSON.as_bytes(), PayloadFormat::Json);
    let from_proto: Vec<TraceRow> =
        rows_of(&trace_request().encode_to_vec(), PayloadFormat::Protobuf);
    assert_eq!(from_json, from_proto);

    let row = &from_json[0];
    assert_eq!(row.service_name(), "checkout");
    assert_eq!(row.resource.attributes["host.cores"], "8");
    assert_eq!(row.attributes["ratio"], "0.25");
    assert_eq!(row.attributes["tags"], r#"["a","b"]"#);
    assert_eq!(row.attributes["ok"], "true");
    assert_eq!(row.span_kind, "SERVER");
    assert_eq!(row.duration, 5_000);
    assert_eq!(row.links[0].trace_id, "0102030405060708090a0b0c0d0e0f10");
}

#[test]
fn logs_json_and_protobuf_agree() {
    let from_json: Vec<LogRow> = rows_of(LOGS_JSON.as_bytes(), PayloadFormat::Json);
    let from_proto: Vec<LogRow> = rows_of(&logs_request().encode_to_vec(), PayloadFormat::Protobuf);
    assert_eq!(from_json, from_proto);

    let row = &from_json[0];
    assert_eq!(row.timestamp, 1_700_000_000_000_002);
    assert_eq!(row.severity_number, 13);
    assert_eq!(row.body, r#"{"msg":"low disk"}"#);
    assert_eq!(row.attributes["bytes"], "AQID");
}

#[test]
fn metrics_json_and_protobuf_agree() {
    let from_json: Vec<MetricRow> = rows_of(METRICS_JSON.as_bytes(), PayloadFormat::Json);
    let from_proto: Vec<MetricRow> =
        rows_of(&metrics_request().encode_to_vec(), PayloadFormat::Protobuf);
    assert_eq!(from_json, from_proto);

    assert_eq!(
        from_json[0].data,
        MetricData::Sum {
            value: Some(42.0),
            aggregation_temporality: 2,
            is_monotonic: true,
        }
    );
    assert_eq!(from_json[1].metric_name(), Some("latency"));
    assert_eq!(from_json[1].timestamp, 1_700_000_000_000_000);
}

/// A trace request whose encoding starts `0a 7b`: field 1 with a 123-byte body, which
/// also reads as `\n{`.
fn newline_brace_request() -> Vec<u8> {
    (0..120)
        .map(|padding| ExportTraceServiceRequest {
            resource_spans: vec![ResourceSpans {
                resource: resource("edge"),
                schema_url: "x".repeat(padding),
                scope_spans: vec![ScopeSpans {
                    spans: vec![Span {
                        trace_id: hex_id("5b8efff798038103d269b633813fc60c"),
                        span_id: hex_id("eee19b7ec3c1b174"),
                        name: "GET /health".to_string(),
                        start_time_unix_nano: 1_700_000_000_000_000_000,
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
            }],
        })
        .map(|request| request.encode_to_vec())
        .find(|bytes| bytes.starts_with(&[0x0a, b'{']))
        .expect("some padding yields a 123-byte resource")
}

#[test]
fn protobuf_that_starts_like_a_newline_and_brace_still_decodes() {
    let payload = newline_brace_request();
    assert_eq!(otlpstore_core::detect_format(&payload), PayloadFormat::Json);

    let rows: Vec<TraceRow> = rows_of(&payload, PayloadFormat::Protobuf);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].service_name(), "edge");
    assert_eq!(rows[0].span_name, "GET /health");

    let hinted = normalize_rows::<TraceRow>(&payload, Some(PayloadFormat::Json)).unwrap();
    assert_eq!(hinted.format, PayloadFormat::Json);
    assert_eq!(hinted.row_count(), 0);
    assert!(hinted.error_count() >= 1);
}

#[test]
fn non_finite_doubles_in_json_become_rows() {
    let payload = r#"{"resourceMetrics":[{"scopeMetrics":[{"metrics":[{"name":"ratio","gauge":{"dataPoints":[{"timeUnixNano":"1000","asDouble":"NaN"}]}},{"name":"latency","histogram":{"dataPoints":[{"timeUnixNano":"1000","count":"1","sum":"Infinity","bucketCounts":["1"],"explicitBounds":[],"min":"-Infinity"}]}}]}]}]}"#;
    let rows: Vec<MetricRow> = rows_of(payload.as_bytes(), PayloadFormat::Json);
    assert_eq!(rows.len(), 2);

    assert!(matches!(rows[0].data, MetricData::Gauge { value: Some(v) } if v.is_nan()));
    let MetricData::Histogram { sum, min, .. } = &rows[1].data else {
        panic!("expected a histogram row");
    };
    assert_eq!(*sum, Some(f64::INFINITY));
    assert_eq!(*min, Some(f64::NEG_INFINITY));
}

#[test]
fn json_lines_with_one_malformed_line() {
    let payload = format!("{TRACE_JSON}\n{TRACE_JSON}\nthis is not json\n{TRACE_JSON}\n");
    let normalized = normalize(payload.as_bytes(), SignalKind::Traces, None).unwrap();

    let mut rows = 0;
    let mut failures = Vec::new();
    for doc in &normalized.documents {
        match &doc.outcome {
            Ok(SignalRows::Traces(batch)) => rows += batch.len(),
            Ok(other) => panic!("unexpected rows {:?}", other.signal()),
            Err(e) => failures.push((doc.line, e.kind())),
        }
    }

    assert_eq!(rows, 3);
    assert_eq!(failures, vec![(Some(3), ErrorKind::Format)]);
}

#[test]
fn invalid_timestamp_fails_only_its_line() {
    let bad = TRACE_JSON.replace("\"1700000000000000123\"", "\"soon\"");
    let payload = format!("{TRACE_JSON}\n{bad}\n");
    let normalized = normalize_rows::<TraceRow>(payload.as_bytes(), None).unwrap();

    assert_eq!(normalized.row_count(), 1);
    let err = normalized.errors().next().unwrap();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert_eq!(err.line(), Some(2));
    assert!(err.to_string().contains("start_time_unix_nano"));
}

#[test]
fn gauge_from_json_has_only_a_value() {
    let payload = r#"{"resourceMetrics":[{"scopeMetrics":[{"metrics":[{"name":"temp","gauge":{"dataPoints":[{"asDouble":42.5}]}}]}]}]}"#;
    let rows: Vec<MetricRow> = rows_of(payload.as_bytes(), PayloadFormat::Json);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].data, MetricData::Gauge { value: Some(42.5) });
    assert_eq!(rows[0].service_name(), "unknown_service");

    let batch = MetricRow::to_record_batch(&rows).unwrap();
    for idx in PAYLOAD_COLUMNS {
        assert_eq!(batch.column(idx).is_null(0), idx != VALUE);
    }
}

proptest! {
    #[test]
    fn micros_conversion_rounds_to_nearest(nanos in any::<u64>()) {
        let micros = nanos_to_micros(nanos) as i128;
        let diff = micros * 1_000 - nanos as i128;
        prop_assert!(diff > -500 && diff <= 500, "{nanos} -> {micros}");
    }
}
