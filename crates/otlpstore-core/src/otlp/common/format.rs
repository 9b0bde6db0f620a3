// Wire-format decoding of OTLP export requests.
//
// Protobuf payloads decode in one pass. JSON payloads are split into documents
// (one document, or one per JSON Lines line), each normalized and deserialized on
// its own so a bad line never takes its neighbours down with it.

use prost::Message;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use otlpstore_proto::opentelemetry::proto::collector::{
    logs::v1::ExportLogsServiceRequest, metrics::v1::ExportMetricsServiceRequest,
    trace::v1::ExportTraceServiceRequest,
};

use super::json_normalizer::normalize_json_value;
use crate::error::NormalizeError;
use crate::signal::SignalKind;

/// Trait implemented by OTLP export requests that can be parsed from both encodings.
pub trait OtlpSignalRequest: Message + Default + DeserializeOwned {
    const SIGNAL: SignalKind;

    /// Number of leaf records (spans, log records, data points) in the request.
    fn record_count(&self) -> usize;
}

impl OtlpSignalRequest for ExportTraceServiceRequest {
    const SIGNAL: SignalKind = SignalKind::Traces;

    fn record_count(&self) -> usize {
        self.resource_spans
            .iter()
            .flat_map(|rs| rs.scope_spans.iter())
            .map(|ss| ss.spans.len())
            .sum()
    }
}

impl OtlpSignalRequest for ExportLogsServiceRequest {
    const SIGNAL: SignalKind = SignalKind::Logs;

    fn record_count(&self) -> usize {
        self.resource_logs
            .iter()
            .flat_map(|rl| rl.scope_logs.iter())
            .map(|sl| sl.log_records.len())
            .sum()
    }
}

impl OtlpSignalRequest for ExportMetricsServiceRequest {
    const SIGNAL: SignalKind = SignalKind::Metrics;

    fn record_count(&self) -> usize {
        use otlpstore_proto::opentelemetry::proto::metrics::v1::metric::Data;

        self.resource_metrics
            .iter()
            .flat_map(|rm| rm.scope_metrics.iter())
            .flat_map(|sm| sm.metrics.iter())
            .map(|metric| match &metric.data {
                Some(Data::Gauge(g)) => g.data_points.len(),
                Some(Data::Sum(s)) => s.data_points.len(),
                Some(Data::Histogram(h)) => h.data_points.len(),
                Some(Data::ExponentialHistogram(e)) => e.data_points.len(),
                Some(Data::Summary(s)) => s.data_points.len(),
                None => 0,
            })
            .sum()
    }
}

/// One decoded request, or the reason it could not be decoded.
pub(crate) struct ParsedDocument<R> {
    /// 1-based line of a JSON document; `None` for protobuf.
    pub line: Option<usize>,
    pub result: Result<R, NormalizeError>,
}

pub(crate) fn parse_protobuf<R: OtlpSignalRequest>(bytes: &[u8]) -> ParsedDocument<R> {
    let result = R::decode(bytes).map_err(|source| NormalizeError::Protobuf {
        signal: R::SIGNAL,
        len: bytes.len(),
        source,
    });
    ParsedDocument { line: None, result }
}

/// Split a JSON payload into documents and decode each one.
///
/// A payload that parses as a single JSON value is one document. Otherwise, if it
/// has several non-blank lines and at least one of them is a complete JSON object on
/// its own, every non-blank line is a separate document. Anything else is reported
/// as one malformed document.
pub(crate) fn parse_json_documents<R: OtlpSignalRequest>(bytes: &[u8]) -> Vec<ParsedDocument<R>> {
    let first_line = first_content_line(bytes);

    let whole_error = match serde_json::from_slice::<JsonValue>(bytes) {
        Ok(value) => {
            return vec![ParsedDocument {
                line: Some(first_line),
                result: request_from_value(value, first_line),
            }]
        }
        Err(e) => e,
    };

    let lines: Vec<(usize, &[u8])> = bytes
        .split(|b| *b == b'\n')
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.iter().all(u8::is_ascii_whitespace))
        .collect();

    if lines.is_empty() {
        return Vec::new();
    }

    let is_json_lines = lines.len() > 1
        && lines.iter().any(|(_, line)| {
            starts_with_brace(line) && serde_json::from_slice::<JsonValue>(line).is_ok()
        });

    if !is_json_lines {
        return vec![ParsedDocument {
            line: Some(whole_error.line().max(first_line)),
            result: Err(NormalizeError::MalformedJson {
                signal: R::SIGNAL,
                line: whole_error.line().max(first_line),
                source: whole_error,
            }),
        }];
    }

    lines
        .into_iter()
        .map(|(line_no, line)| {
            let result = serde_json::from_slice::<JsonValue>(line)
                .map_err(|source| NormalizeError::MalformedJson {
                    signal: R::SIGNAL,
                    line: line_no,
                    source,
                })
                .and_then(|value| request_from_value(value, line_no));
            ParsedDocument {
                line: Some(line_no),
                result,
            }
        })
        .collect()
}

fn request_from_value<R: OtlpSignalRequest>(
    mut value: JsonValue,
    line: usize,
) -> Result<R, NormalizeError> {
    let signal = R::SIGNAL;
    let root = value
        .as_object()
        .ok_or(NormalizeError::NotAnObject { signal, line })?;

    let records = root
        .get(signal.json_root_field())
        .or_else(|| root.get(signal.proto_root_field()))
        .ok_or(NormalizeError::MissingField {
            signal,
            line,
            field: signal.json_root_field(),
        })?;
    if !records.is_array() {
        return Err(NormalizeError::InvalidValue {
            signal,
            line,
            field: signal.json_root_field().to_string(),
            reason: format!("expected an array, found {}", json_type_name(records)),
        });
    }

    normalize_json_value(&mut value, None).map_err(|e| e.at(signal, line))?;

    serde_json::from_value(value).map_err(|e| NormalizeError::InvalidValue {
        signal,
        line,
        field: signal.json_root_field().to_string(),
        reason: e.to_string(),
    })
}

fn first_content_line(bytes: &[u8]) -> usize {
    let leading = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(0);
    1 + bytes[..leading].iter().filter(|b| **b == b'\n').count()
}

fn starts_with_brace(line: &[u8]) -> bool {
    line.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{')
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
