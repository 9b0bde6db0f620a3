// Union metric schema
//
// One row layout for all five metric shapes: 9 base columns, the `MetricType`
// discriminator, then the superset of every shape's payload columns. Payload columns
// that do not belong to a row's shape are null.

use std::sync::{Arc, OnceLock};

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};

use super::{attribute_map_type, list_of, schema_metadata, utc_timestamp};
use crate::otlp::common::field_names::arrow as field;
use crate::signal::{MetricType, SignalKind};

pub const TIMESTAMP_COLUMN: usize = 0;
pub const SERVICE_NAME_COLUMN: usize = 1;
pub const METRIC_NAME_COLUMN: usize = 2;
pub const METRIC_TYPE_COLUMN: usize = 9;

/// Number of shared base columns ahead of the discriminator.
pub const BASE_COLUMN_COUNT: usize = 9;

pub const VALUE: usize = 10;
pub const AGGREGATION_TEMPORALITY: usize = 11;
pub const IS_MONOTONIC: usize = 12;
pub const COUNT: usize = 13;
pub const SUM: usize = 14;
pub const BUCKET_COUNTS: usize = 15;
pub const EXPLICIT_BOUNDS: usize = 16;
pub const SCALE: usize = 17;
pub const ZERO_COUNT: usize = 18;
pub const POSITIVE_OFFSET: usize = 19;
pub const POSITIVE_BUCKET_COUNTS: usize = 20;
pub const NEGATIVE_OFFSET: usize = 21;
pub const NEGATIVE_BUCKET_COUNTS: usize = 22;
pub const QUANTILE_VALUES: usize = 23;
pub const QUANTILE_QUANTILES: usize = 24;
pub const MIN: usize = 25;
pub const MAX: usize = 26;

/// Every payload column in schema order.
pub const PAYLOAD_COLUMNS: [usize; 17] = [
    VALUE,
    AGGREGATION_TEMPORALITY,
    IS_MONOTONIC,
    COUNT,
    SUM,
    BUCKET_COUNTS,
    EXPLICIT_BOUNDS,
    SCALE,
    ZERO_COUNT,
    POSITIVE_OFFSET,
    POSITIVE_BUCKET_COUNTS,
    NEGATIVE_OFFSET,
    NEGATIVE_BUCKET_COUNTS,
    QUANTILE_VALUES,
    QUANTILE_QUANTILES,
    MIN,
    MAX,
];

impl MetricType {
    /// Payload columns populated for rows of this shape; all others are null.
    pub const fn payload_columns(&self) -> &'static [usize] {
        match self {
            MetricType::Gauge => &[VALUE],
            MetricType::Sum => &[VALUE, AGGREGATION_TEMPORALITY, IS_MONOTONIC],
            MetricType::Histogram => &[COUNT, SUM, BUCKET_COUNTS, EXPLICIT_BOUNDS, MIN, MAX],
            MetricType::ExponentialHistogram => &[
                COUNT,
                SUM,
                SCALE,
                ZERO_COUNT,
                POSITIVE_OFFSET,
                POSITIVE_BUCKET_COUNTS,
                NEGATIVE_OFFSET,
                NEGATIVE_BUCKET_COUNTS,
                MIN,
                MAX,
            ],
            MetricType::Summary => &[COUNT, SUM, QUANTILE_VALUES, QUANTILE_QUANTILES],
        }
    }
}

/// Cached union schema for metric rows. Timestamps are microseconds.
pub fn metrics_schema() -> SchemaRef {
    static SCHEMA: OnceLock<SchemaRef> = OnceLock::new();
    Arc::clone(SCHEMA.get_or_init(|| Arc::new(build_schema())))
}

/// Projection serving a single-shape metric table from the union schema:
/// the base columns followed by that shape's payload columns.
pub fn metric_table_projection(metric_type: MetricType) -> Vec<usize> {
    (0..BASE_COLUMN_COUNT)
        .chain(metric_type.payload_columns().iter().copied())
        .collect()
}

fn build_schema() -> Schema {
    let string = DataType::Utf8;
    let attributes = attribute_map_type();
    let u64_list = list_of(DataType::UInt64);
    let f64_list = list_of(DataType::Float64);

    let fields = vec![
        // Base columns
        Field::new(field::TIMESTAMP, utc_timestamp(TimeUnit::Microsecond), false),
        Field::new(field::SERVICE_NAME, string.clone(), false),
        Field::new(field::METRIC_NAME, string.clone(), false),
        Field::new(field::METRIC_DESCRIPTION, string.clone(), false),
        Field::new(field::METRIC_UNIT, string.clone(), false),
        Field::new(field::RESOURCE_ATTRIBUTES, attributes.clone(), false),
        Field::new(field::SCOPE_NAME, string.clone(), false),
        Field::new(field::SCOPE_VERSION, string.clone(), false),
        Field::new(field::ATTRIBUTES, attributes, false),
        // Discriminator
        Field::new(field::METRIC_TYPE, string, false),
        // Gauge / Sum
        Field::new(field::VALUE, DataType::Float64, true),
        Field::new(field::AGGREGATION_TEMPORALITY, DataType::Int32, true),
        Field::new(field::IS_MONOTONIC, DataType::Boolean, true),
        // Histogram / ExponentialHistogram / Summary
        Field::new(field::COUNT, DataType::UInt64, true),
        Field::new(field::SUM, DataType::Float64, true),
        Field::new(field::BUCKET_COUNTS, u64_list.clone(), true),
        Field::new(field::EXPLICIT_BOUNDS, f64_list.clone(), true),
        // ExponentialHistogram
        Field::new(field::SCALE, DataType::Int32, true),
        Field::new(field::ZERO_COUNT, DataType::UInt64, true),
        Field::new(field::POSITIVE_OFFSET, DataType::Int32, true),
        Field::new(field::POSITIVE_BUCKET_COUNTS, u64_list.clone(), true),
        Field::new(field::NEGATIVE_OFFSET, DataType::Int32, true),
        Field::new(field::NEGATIVE_BUCKET_COUNTS, u64_list, true),
        // Summary
        Field::new(field::QUANTILE_VALUES, f64_list.clone(), true),
        Field::new(field::QUANTILE_QUANTILES, f64_list, true),
        // Histogram / ExponentialHistogram
        Field::new(field::MIN, DataType::Float64, true),
        Field::new(field::MAX, DataType::Float64, true),
    ];

    Schema::new_with_metadata(fields, schema_metadata(SignalKind::Metrics))
}
