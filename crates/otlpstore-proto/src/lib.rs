// otlpstore-proto - OpenTelemetry Protocol Definitions
//
// Message types for OTLP v1, checked in so the workspace builds without protoc.
// Every message derives serde in addition to prost: canonical OTLP JSON is
// normalised into the prost field layout and then deserialized into these structs.

pub mod serde_f64;

pub mod opentelemetry {
    pub mod proto {
        pub mod collector {
            pub mod logs {
                pub mod v1 {
                    include!("proto/opentelemetry.proto.collector.logs.v1.rs");
                }
            }
            pub mod trace {
                pub mod v1 {
                    include!("proto/opentelemetry.proto.collector.trace.v1.rs");
                }
            }
            pub mod metrics {
                pub mod v1 {
                    include!("proto/opentelemetry.proto.collector.metrics.v1.rs");
                }
            }
        }
        pub mod logs {
            pub mod v1 {
                include!("proto/opentelemetry.proto.logs.v1.rs");
            }
        }
        pub mod trace {
            pub mod v1 {
                include!("proto/opentelemetry.proto.trace.v1.rs");
            }
        }
        pub mod metrics {
            pub mod v1 {
                include!("proto/opentelemetry.proto.metrics.v1.rs");
            }
        }
        pub mod common {
            pub mod v1 {
                include!("proto/opentelemetry.proto.common.v1.rs");
            }
        }
        pub mod resource {
            pub mod v1 {
                include!("proto/opentelemetry.proto.resource.v1.rs");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::opentelemetry::proto::collector::trace::v1::ExportTraceServiceRequest;
    use super::opentelemetry::proto::common::v1::{any_value, AnyValue, KeyValue};
    use super::opentelemetry::proto::trace::v1::{span::SpanKind, ResourceSpans, ScopeSpans, Span};
    use prost::Message;

    #[test]
    fn span_survives_protobuf_encoding() {
        let request = ExportTraceServiceRequest {
            resource_spans: vec![ResourceSpans {
                scope_spans: vec![ScopeSpans {
                    spans: vec![Span {
                        trace_id: vec![0xab; 16],
                        span_id: vec![0xcd; 8],
                        name: "GET /".to_string(),
                        kind: SpanKind::Server as i32,
                        start_time_unix_nano: 1_700_000_000_000_000_000,
                        end_time_unix_nano: 1_700_000_000_500_000_000,
                        attributes: vec![KeyValue {
                            key: "http.status_code".to_string(),
                            value: Some(AnyValue {
                                value: Some(any_value::Value::IntValue(200)),
                            }),
                        }],
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        };

        let bytes = request.encode_to_vec();
        let decoded = ExportTraceServiceRequest::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn enum_names_round_trip() {
        assert_eq!(SpanKind::Server.as_str_name(), "SPAN_KIND_SERVER");
        assert_eq!(
            SpanKind::from_str_name("SPAN_KIND_CONSUMER"),
            Some(SpanKind::Consumer)
        );
        assert_eq!(SpanKind::from_str_name("SERVER"), None);
    }

    #[test]
    fn deserializes_prost_shaped_json() {
        let json = r#"{"key":"service.name","value":{"value":{"StringValue":"checkout"}}}"#;
        let kv: KeyValue = serde_json::from_str(json).unwrap();
        assert_eq!(
            kv.value.and_then(|v| v.value),
            Some(any_value::Value::StringValue("checkout".to_string()))
        );
    }
}
