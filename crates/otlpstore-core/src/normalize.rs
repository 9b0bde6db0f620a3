//! `normalize`: payload bytes to typed rows, reported per document.

use tracing::debug;

use crate::detect::{sniff, PayloadFormat};
use crate::error::NormalizeError;
use crate::otlp::common::format::{parse_json_documents, parse_protobuf, ParsedDocument};
use crate::otlp::{LogRow, MetricRow, TraceRow};
use crate::row::TelemetryRow;
use crate::signal::SignalKind;

/// Bytes of the payload quoted in an unknown-format error.
const PREFIX_PREVIEW: usize = 16;

/// One unit of work: a JSON document (one line of JSON Lines, or the whole file) or a
/// protobuf payload, with either its rows or the reason it failed.
#[derive(Debug)]
pub struct Document<B> {
    /// 1-based line of a JSON document; `None` for protobuf.
    pub line: Option<usize>,
    pub outcome: Result<B, NormalizeError>,
}

/// Outcome of normalizing one payload.
///
/// Successful documents and failed ones are kept side by side; callers decide whether a
/// failure aborts their work or is skipped.
#[derive(Debug)]
pub struct Normalized<B> {
    pub format: PayloadFormat,
    pub documents: Vec<Document<B>>,
}

impl<B> Normalized<B> {
    pub fn errors(&self) -> impl Iterator<Item = &NormalizeError> {
        self.documents.iter().filter_map(|d| d.outcome.as_ref().err())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn map<C>(self, mut f: impl FnMut(B) -> C) -> Normalized<C> {
        Normalized {
            format: self.format,
            documents: self
                .documents
                .into_iter()
                .map(|doc| Document {
                    line: doc.line,
                    outcome: doc.outcome.map(&mut f),
                })
                .collect(),
        }
    }
}

impl<R> Normalized<Vec<R>> {
    pub fn row_count(&self) -> usize {
        self.documents
            .iter()
            .filter_map(|d| d.outcome.as_ref().ok())
            .map(Vec::len)
            .sum()
    }

    /// All rows in document order, or the first failure.
    pub fn into_rows(self) -> Result<Vec<R>, NormalizeError> {
        let mut rows = Vec::new();
        for doc in self.documents {
            rows.extend(doc.outcome?);
        }
        Ok(rows)
    }
}

/// Rows of any signal, as returned by [`normalize`].
#[derive(Debug, Clone)]
pub enum SignalRows {
    Traces(Vec<TraceRow>),
    Logs(Vec<LogRow>),
    Metrics(Vec<MetricRow>),
}

impl SignalRows {
    pub fn signal(&self) -> SignalKind {
        match self {
            SignalRows::Traces(_) => SignalKind::Traces,
            SignalRows::Logs(_) => SignalKind::Logs,
            SignalRows::Metrics(_) => SignalKind::Metrics,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SignalRows::Traces(rows) => rows.len(),
            SignalRows::Logs(rows) => rows.len(),
            SignalRows::Metrics(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalize a payload into rows of `R`.
///
/// `hint` skips format detection (an `Unknown` hint is ignored). The only error returned
/// directly is an undetectable format; every other failure is attached to its document.
///
/// Without a hint, a payload that sniffs as JSON but also walks as protobuf is decoded
/// as protobuf when every JSON document fails and the protobuf decode succeeds.
pub fn normalize_rows<R: TelemetryRow>(
    payload: &[u8],
    hint: Option<PayloadFormat>,
) -> Result<Normalized<Vec<R>>, NormalizeError> {
    let (mut format, fallback) = match hint {
        Some(format) if format != PayloadFormat::Unknown => (format, None),
        _ => sniff(payload),
    };

    let mut parsed = parse_as::<R>(format, payload)?;
    if let Some(fallback) = fallback {
        if parsed.iter().all(|doc| doc.result.is_err()) {
            let retry = parse_as::<R>(fallback, payload)?;
            if retry.iter().all(|doc| doc.result.is_ok()) {
                debug!(signal = %R::SIGNAL, from = %format, to = %fallback, "format fallback");
                format = fallback;
                parsed = retry;
            }
        }
    }

    let documents: Vec<Document<Vec<R>>> = parsed
        .into_iter()
        .map(|doc| Document {
            line: doc.line,
            outcome: doc.result.map(|request| R::rows_from_request(&request)),
        })
        .collect();

    let normalized = Normalized { format, documents };
    debug!(
        signal = %R::SIGNAL,
        format = %format,
        bytes = payload.len(),
        documents = normalized.documents.len(),
        rows = normalized.row_count(),
        errors = normalized.error_count(),
        "normalized payload"
    );
    Ok(normalized)
}

fn parse_as<R: TelemetryRow>(
    format: PayloadFormat,
    payload: &[u8],
) -> Result<Vec<ParsedDocument<R::Request>>, NormalizeError> {
    match format {
        PayloadFormat::Json => Ok(parse_json_documents(payload)),
        PayloadFormat::Protobuf => Ok(vec![parse_protobuf(payload)]),
        PayloadFormat::Unknown => Err(NormalizeError::UnknownFormat {
            signal: R::SIGNAL,
            prefix: hex_prefix(payload),
        }),
    }
}

/// Normalize a payload for a signal chosen at runtime.
pub fn normalize(
    payload: &[u8],
    signal: SignalKind,
    hint: Option<PayloadFormat>,
) -> Result<Normalized<SignalRows>, NormalizeError> {
    Ok(match signal {
        SignalKind::Traces => normalize_rows::<TraceRow>(payload, hint)?.map(SignalRows::Traces),
        SignalKind::Logs => normalize_rows::<LogRow>(payload, hint)?.map(SignalRows::Logs),
        SignalKind::Metrics => {
            normalize_rows::<MetricRow>(payload, hint)?.map(SignalRows::Metrics)
        }
    })
}

fn hex_prefix(payload: &[u8]) -> String {
    let shown = &payload[..payload.len().min(PREFIX_PREVIEW)];
    if shown.is_empty() {
        "<empty>".to_string()
    } else {
        hex::encode(shown)
    }
}
