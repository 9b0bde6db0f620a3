// OTLP to typed rows
//
// Each signal module walks Resource -> Scope -> record nesting, builds one row per
// leaf record and knows how to turn its rows into an Arrow record batch.

pub mod common;
pub mod logs;
pub mod metrics;
pub mod traces;

pub use logs::LogRow;
pub use metrics::{ExponentialBuckets, MetricContext, MetricData, MetricRow};
pub use traces::{SpanEvent, SpanLink, TraceRow};
