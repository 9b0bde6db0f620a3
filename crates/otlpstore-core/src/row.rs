//! The `TelemetryRow` trait tying a typed row to its request type, schema and builder.

use std::fmt::Debug;

use arrow::array::RecordBatch;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;

use crate::otlp::common::format::OtlpSignalRequest;
use crate::signal::SignalKind;

/// A normalized telemetry row with a fixed Arrow schema.
///
/// The column index constants are what the columnar buffer's zone maps summarise:
/// the timestamp column always, the service name column always, and a metric name
/// column for metric rows.
pub trait TelemetryRow: Clone + Send + Sync + Debug + 'static {
    /// Export request this row family is extracted from.
    type Request: OtlpSignalRequest;

    const SIGNAL: SignalKind;
    const TIMESTAMP_COLUMN: usize = 0;
    const SERVICE_NAME_COLUMN: usize;
    const METRIC_NAME_COLUMN: Option<usize> = None;

    fn schema() -> SchemaRef;

    /// Timestamp in the schema's native unit.
    fn timestamp(&self) -> i64;

    fn service_name(&self) -> &str;

    fn metric_name(&self) -> Option<&str> {
        None
    }

    /// Append one row per leaf record (span, log record, data point) of `request`.
    fn extend_from_request(request: &Self::Request, rows: &mut Vec<Self>);

    /// Build a record batch of [`TelemetryRow::schema`] from `rows`, in order.
    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, ArrowError>;

    fn rows_from_request(request: &Self::Request) -> Vec<Self> {
        let mut rows = Vec::with_capacity(request.record_count());
        Self::extend_from_request(request, &mut rows);
        rows
    }
}
