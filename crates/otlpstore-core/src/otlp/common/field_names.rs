//! Field name constants for OTLP and Arrow schemas.
//!
//! Two naming conventions are in use:
//!
//! - **OTLP protobuf fields** (snake_case): JSON normalization works on these after
//!   converting canonical camelCase keys
//! - **Arrow columns** (PascalCase): the row schemas exposed to scans

/// OTLP protobuf field names (snake_case as per the OpenTelemetry protos).
pub mod otlp {
    pub const TIME_UNIX_NANO: &str = "time_unix_nano";
    pub const OBSERVED_TIME_UNIX_NANO: &str = "observed_time_unix_nano";
    pub const START_TIME_UNIX_NANO: &str = "start_time_unix_nano";
    pub const END_TIME_UNIX_NANO: &str = "end_time_unix_nano";

    pub const TRACE_ID: &str = "trace_id";
    pub const SPAN_ID: &str = "span_id";
    pub const PARENT_SPAN_ID: &str = "parent_span_id";
    pub const FLAGS: &str = "flags";

    pub const KIND: &str = "kind";
    pub const CODE: &str = "code";
    pub const SEVERITY_NUMBER: &str = "severity_number";
    pub const AGGREGATION_TEMPORALITY: &str = "aggregation_temporality";

    pub const DROPPED_ATTRIBUTES_COUNT: &str = "dropped_attributes_count";
    pub const DROPPED_EVENTS_COUNT: &str = "dropped_events_count";
    pub const DROPPED_LINKS_COUNT: &str = "dropped_links_count";

    // AnyValue oneof variants
    pub const STRING_VALUE: &str = "string_value";
    pub const BOOL_VALUE: &str = "bool_value";
    pub const INT_VALUE: &str = "int_value";
    pub const DOUBLE_VALUE: &str = "double_value";
    pub const ARRAY_VALUE: &str = "array_value";
    pub const KVLIST_VALUE: &str = "kvlist_value";
    pub const BYTES_VALUE: &str = "bytes_value";
    pub const VALUE: &str = "value";

    // Metrics
    pub const METRICS: &str = "metrics";
    pub const DATA: &str = "data";
    pub const DATA_POINTS: &str = "data_points";
    pub const EXEMPLARS: &str = "exemplars";
    pub const GAUGE: &str = "gauge";
    pub const SUM: &str = "sum";
    pub const HISTOGRAM: &str = "histogram";
    pub const EXPONENTIAL_HISTOGRAM: &str = "exponential_histogram";
    pub const SUMMARY: &str = "summary";
    pub const AS_DOUBLE: &str = "as_double";
    pub const AS_INT: &str = "as_int";
    pub const COUNT: &str = "count";
    pub const ZERO_COUNT: &str = "zero_count";
    pub const SCALE: &str = "scale";
    pub const OFFSET: &str = "offset";
    pub const BUCKET_COUNTS: &str = "bucket_counts";
    pub const EXPLICIT_BOUNDS: &str = "explicit_bounds";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const ZERO_THRESHOLD: &str = "zero_threshold";
    pub const QUANTILE: &str = "quantile";
}

/// Arrow column names shared by the row schemas.
pub mod arrow {
    pub const TIMESTAMP: &str = "Timestamp";
    pub const TRACE_ID: &str = "TraceId";
    pub const SPAN_ID: &str = "SpanId";
    pub const SERVICE_NAME: &str = "ServiceName";
    pub const RESOURCE_ATTRIBUTES: &str = "ResourceAttributes";
    pub const SCOPE_NAME: &str = "ScopeName";
    pub const SCOPE_VERSION: &str = "ScopeVersion";

    // Traces
    pub const PARENT_SPAN_ID: &str = "ParentSpanId";
    pub const TRACE_STATE: &str = "TraceState";
    pub const SPAN_NAME: &str = "SpanName";
    pub const SPAN_KIND: &str = "SpanKind";
    pub const SPAN_ATTRIBUTES: &str = "SpanAttributes";
    pub const DURATION: &str = "Duration";
    pub const STATUS_CODE: &str = "StatusCode";
    pub const STATUS_MESSAGE: &str = "StatusMessage";
    pub const EVENTS_TIMESTAMP: &str = "Events.Timestamp";
    pub const EVENTS_NAME: &str = "Events.Name";
    pub const EVENTS_ATTRIBUTES: &str = "Events.Attributes";
    pub const LINKS_TRACE_ID: &str = "Links.TraceId";
    pub const LINKS_SPAN_ID: &str = "Links.SpanId";
    pub const LINKS_TRACE_STATE: &str = "Links.TraceState";
    pub const LINKS_ATTRIBUTES: &str = "Links.Attributes";

    // Logs
    pub const TRACE_FLAGS: &str = "TraceFlags";
    pub const SEVERITY_TEXT: &str = "SeverityText";
    pub const SEVERITY_NUMBER: &str = "SeverityNumber";
    pub const BODY: &str = "Body";
    pub const RESOURCE_SCHEMA_URL: &str = "ResourceSchemaUrl";
    pub const SCOPE_SCHEMA_URL: &str = "ScopeSchemaUrl";
    pub const SCOPE_ATTRIBUTES: &str = "ScopeAttributes";
    pub const LOG_ATTRIBUTES: &str = "LogAttributes";

    // Metrics
    pub const METRIC_NAME: &str = "MetricName";
    pub const METRIC_DESCRIPTION: &str = "MetricDescription";
    pub const METRIC_UNIT: &str = "MetricUnit";
    pub const ATTRIBUTES: &str = "Attributes";
    pub const METRIC_TYPE: &str = "MetricType";
    pub const VALUE: &str = "Value";
    pub const AGGREGATION_TEMPORALITY: &str = "AggregationTemporality";
    pub const IS_MONOTONIC: &str = "IsMonotonic";
    pub const COUNT: &str = "Count";
    pub const SUM: &str = "Sum";
    pub const BUCKET_COUNTS: &str = "BucketCounts";
    pub const EXPLICIT_BOUNDS: &str = "ExplicitBounds";
    pub const SCALE: &str = "Scale";
    pub const ZERO_COUNT: &str = "ZeroCount";
    pub const POSITIVE_OFFSET: &str = "PositiveOffset";
    pub const POSITIVE_BUCKET_COUNTS: &str = "PositiveBucketCounts";
    pub const NEGATIVE_OFFSET: &str = "NegativeOffset";
    pub const NEGATIVE_BUCKET_COUNTS: &str = "NegativeBucketCounts";
    pub const QUANTILE_VALUES: &str = "QuantileValues";
    pub const QUANTILE_QUANTILES: &str = "QuantileQuantiles";
    pub const MIN: &str = "Min";
    pub const MAX: &str = "Max";
}

/// OpenTelemetry semantic convention attribute keys.
pub mod semconv {
    pub const SERVICE_NAME: &str = "service.name";
}
