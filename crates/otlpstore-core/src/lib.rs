// otlpstore-core - OTLP normalization
//
// Pure processing logic: OTLP JSON / JSON Lines / protobuf bytes in, typed rows and
// Arrow record batches out. No I/O, no threads, no buffering.

pub mod detect;
pub mod error;
pub mod normalize;
pub mod otlp;
pub mod row;
pub mod schema;
pub mod signal;

pub use detect::{detect_format, PayloadFormat, DETECT_WINDOW};
pub use error::{ErrorKind, NormalizeError};
pub use normalize::{normalize, normalize_rows, Document, Normalized, SignalRows};
pub use otlp::common::{Attributes, OtlpSignalRequest, ResourceContext, ScopeContext};
pub use otlp::{
    ExponentialBuckets, LogRow, MetricContext, MetricData, MetricRow, SpanEvent, SpanLink,
    TraceRow,
};
pub use row::TelemetryRow;
pub use schema::{logs_schema, metric_table_projection, metrics_schema, traces_schema};
pub use signal::{MetricType, SignalKind};
