use thiserror::Error;

use crate::signal::SignalKind;

/// Coarse classification callers use to decide whether to continue past a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Payload is neither JSON nor plausible protobuf, or cannot be decoded.
    Format,
    /// Encoding is valid but a required top-level OTLP field is missing.
    Structural,
    /// A field is present but cannot be coerced to its required type.
    Value,
    /// Payload exceeds a configured size ceiling.
    Capacity,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Format => "format",
            ErrorKind::Structural => "structural",
            ErrorKind::Value => "value",
            ErrorKind::Capacity => "capacity",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one unit of normalization work (a JSON line/document or a protobuf payload).
///
/// `line` is the 1-based line of the JSON document; protobuf payloads have no line.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{signal}: payload is neither JSON nor protobuf (leading bytes: {prefix})")]
    UnknownFormat { signal: SignalKind, prefix: String },

    #[error("{signal}: line {line}: malformed JSON: {source}")]
    MalformedJson {
        signal: SignalKind,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{signal}: protobuf payload ({len} bytes) failed to decode: {source}")]
    Protobuf {
        signal: SignalKind,
        len: usize,
        #[source]
        source: prost::DecodeError,
    },

    #[error("{signal}: line {line}: document root must be a JSON object")]
    NotAnObject { signal: SignalKind, line: usize },

    #[error("{signal}: line {line}: missing required field `{field}`")]
    MissingField {
        signal: SignalKind,
        line: usize,
        field: &'static str,
    },

    #[error("{signal}: line {line}: invalid value for `{field}`: {reason}")]
    InvalidValue {
        signal: SignalKind,
        line: usize,
        field: String,
        reason: String,
    },
}

impl NormalizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NormalizeError::UnknownFormat { .. }
            | NormalizeError::MalformedJson { .. }
            | NormalizeError::Protobuf { .. } => ErrorKind::Format,
            NormalizeError::NotAnObject { .. } | NormalizeError::MissingField { .. } => {
                ErrorKind::Structural
            }
            NormalizeError::InvalidValue { .. } => ErrorKind::Value,
        }
    }

    pub fn signal(&self) -> SignalKind {
        match self {
            NormalizeError::UnknownFormat { signal, .. }
            | NormalizeError::MalformedJson { signal, .. }
            | NormalizeError::Protobuf { signal, .. }
            | NormalizeError::NotAnObject { signal, .. }
            | NormalizeError::MissingField { signal, .. }
            | NormalizeError::InvalidValue { signal, .. } => *signal,
        }
    }

    /// 1-based JSON line the failure refers to, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            NormalizeError::MalformedJson { line, .. }
            | NormalizeError::NotAnObject { line, .. }
            | NormalizeError::MissingField { line, .. }
            | NormalizeError::InvalidValue { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// A field-level coercion failure raised while normalizing one JSON document.
///
/// The parser attaches signal and line before surfacing it as [`NormalizeError::InvalidValue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub(crate) fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn at(self, signal: SignalKind, line: usize) -> NormalizeError {
        NormalizeError::InvalidValue {
            signal,
            line,
            field: self.field,
            reason: self.reason,
        }
    }
}
