// Union-schema builder for metric rows.
//
// Every payload column gets exactly one append per row: a value when the column
// belongs to the row's shape, a typed null otherwise.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, Int32Builder, ListBuilder, PrimitiveBuilder,
    RecordBatch, StringBuilder, TimestampMicrosecondBuilder, UInt64Builder,
};
use arrow::datatypes::{ArrowPrimitiveType, SchemaRef};
use arrow::error::ArrowError;

use super::{MetricData, MetricRow};
use crate::otlp::common::builder_helpers::{
    append_attributes, attribute_map_builder, AttributeMapBuilder,
};
use crate::schema::list_element;
use crate::schema::metrics::{self as columns, metrics_schema};

/// Payload column values for one row; `None` appends a null.
#[derive(Default)]
struct Payload<'a> {
    value: Option<f64>,
    aggregation_temporality: Option<i32>,
    is_monotonic: Option<bool>,
    count: Option<u64>,
    sum: Option<f64>,
    bucket_counts: Option<&'a [u64]>,
    explicit_bounds: Option<&'a [f64]>,
    scale: Option<i32>,
    zero_count: Option<u64>,
    positive_offset: Option<i32>,
    positive_bucket_counts: Option<&'a [u64]>,
    negative_offset: Option<i32>,
    negative_bucket_counts: Option<&'a [u64]>,
    quantile_values: Option<&'a [f64]>,
    quantile_quantiles: Option<&'a [f64]>,
    min: Option<f64>,
    max: Option<f64>,
}

impl<'a> From<&'a MetricData> for Payload<'a> {
    fn from(data: &'a MetricData) -> Self {
        match data {
            MetricData::Gauge { value } => Payload {
                value: *value,
                ..Payload::default()
            },
            MetricData::Sum {
                value,
                aggregation_temporality,
                is_monotonic,
            } => Payload {
                value: *value,
                aggregation_temporality: Some(*aggregation_temporality),
                is_monotonic: Some(*is_monotonic),
                ..Payload::default()
            },
            MetricData::Histogram {
                count,
                sum,
                bucket_counts,
                explicit_bounds,
                min,
                max,
            } => Payload {
                count: Some(*count),
                sum: *sum,
                bucket_counts: Some(bucket_counts.as_slice()),
                explicit_bounds: Some(explicit_bounds.as_slice()),
                min: *min,
                max: *max,
                ..Payload::default()
            },
            MetricData::ExponentialHistogram {
                count,
                sum,
                scale,
                zero_count,
                positive,
                negative,
                min,
                max,
            } => Payload {
                count: Some(*count),
                sum: *sum,
                scale: Some(*scale),
                zero_count: Some(*zero_count),
                positive_offset: Some(positive.offset),
                positive_bucket_counts: Some(positive.bucket_counts.as_slice()),
                negative_offset: Some(negative.offset),
                negative_bucket_counts: Some(negative.bucket_counts.as_slice()),
                min: *min,
                max: *max,
                ..Payload::default()
            },
            MetricData::Summary {
                count,
                sum,
                quantile_values,
                quantiles,
            } => Payload {
                count: Some(*count),
                sum: Some(*sum),
                quantile_values: Some(quantile_values.as_slice()),
                quantile_quantiles: Some(quantiles.as_slice()),
                ..Payload::default()
            },
        }
    }
}

fn append_list<T: ArrowPrimitiveType>(
    builder: &mut ListBuilder<PrimitiveBuilder<T>>,
    values: Option<&[T::Native]>,
) {
    match values {
        Some(values) => {
            builder.values().append_slice(values);
            builder.append(true);
        }
        None => builder.append_null(),
    }
}

/// Column-wise builder turning [`MetricRow`]s into a record batch of the union schema.
pub struct MetricBatchBuilder {
    schema: SchemaRef,
    timestamp: TimestampMicrosecondBuilder,
    service_name: StringBuilder,
    metric_name: StringBuilder,
    metric_description: StringBuilder,
    metric_unit: StringBuilder,
    resource_attributes: AttributeMapBuilder,
    scope_name: StringBuilder,
    scope_version: StringBuilder,
    attributes: AttributeMapBuilder,
    metric_type: StringBuilder,
    value: Float64Builder,
    aggregation_temporality: Int32Builder,
    is_monotonic: BooleanBuilder,
    count: UInt64Builder,
    sum: Float64Builder,
    bucket_counts: ListBuilder<UInt64Builder>,
    explicit_bounds: ListBuilder<Float64Builder>,
    scale: Int32Builder,
    zero_count: UInt64Builder,
    positive_offset: Int32Builder,
    positive_bucket_counts: ListBuilder<UInt64Builder>,
    negative_offset: Int32Builder,
    negative_bucket_counts: ListBuilder<UInt64Builder>,
    quantile_values: ListBuilder<Float64Builder>,
    quantile_quantiles: ListBuilder<Float64Builder>,
    min: Float64Builder,
    max: Float64Builder,
}

impl MetricBatchBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        let schema = metrics_schema();
        let list_field = |idx: usize| list_element(schema.field(idx));

        Self {
            timestamp: TimestampMicrosecondBuilder::with_capacity(capacity).with_timezone("UTC"),
            service_name: StringBuilder::new(),
            metric_name: StringBuilder::new(),
            metric_description: StringBuilder::new(),
            metric_unit: StringBuilder::new(),
            resource_attributes: attribute_map_builder(),
            scope_name: StringBuilder::new(),
            scope_version: StringBuilder::new(),
            attributes: attribute_map_builder(),
            metric_type: StringBuilder::new(),
            value: Float64Builder::with_capacity(capacity),
            aggregation_temporality: Int32Builder::with_capacity(capacity),
            is_monotonic: BooleanBuilder::with_capacity(capacity),
            count: UInt64Builder::with_capacity(capacity),
            sum: Float64Builder::with_capacity(capacity),
            bucket_counts: ListBuilder::new(UInt64Builder::new())
                .with_field(list_field(columns::BUCKET_COUNTS)),
            explicit_bounds: ListBuilder::new(Float64Builder::new())
                .with_field(list_field(columns::EXPLICIT_BOUNDS)),
            scale: Int32Builder::with_capacity(capacity),
            zero_count: UInt64Builder::with_capacity(capacity),
            positive_offset: Int32Builder::with_capacity(capacity),
            positive_bucket_counts: ListBuilder::new(UInt64Builder::new())
                .with_field(list_field(columns::POSITIVE_BUCKET_COUNTS)),
            negative_offset: Int32Builder::with_capacity(capacity),
            negative_bucket_counts: ListBuilder::new(UInt64Builder::new())
                .with_field(list_field(columns::NEGATIVE_BUCKET_COUNTS)),
            quantile_values: ListBuilder::new(Float64Builder::new())
                .with_field(list_field(columns::QUANTILE_VALUES)),
            quantile_quantiles: ListBuilder::new(Float64Builder::new())
                .with_field(list_field(columns::QUANTILE_QUANTILES)),
            min: Float64Builder::with_capacity(capacity),
            max: Float64Builder::with_capacity(capacity),
            schema,
        }
    }

    pub fn append(&mut self, row: &MetricRow) -> Result<(), ArrowError> {
        self.timestamp.append_value(row.timestamp);
        self.service_name.append_value(&row.resource.service_name);
        self.metric_name.append_value(&row.metric.name);
        self.metric_description.append_value(&row.metric.description);
        self.metric_unit.append_value(&row.metric.unit);
        append_attributes(&mut self.resource_attributes, &row.resource.attributes)?;
        self.scope_name.append_value(&row.scope.name);
        self.scope_version.append_value(&row.scope.version);
        append_attributes(&mut self.attributes, &row.attributes)?;
        self.metric_type.append_value(row.metric_type().as_str());

        let payload = Payload::from(&row.data);
        self.value.append_option(payload.value);
        self.aggregation_temporality
            .append_option(payload.aggregation_temporality);
        self.is_monotonic.append_option(payload.is_monotonic);
        self.count.append_option(payload.count);
        self.sum.append_option(payload.sum);
        append_list(&mut self.bucket_counts, payload.bucket_counts);
        append_list(&mut self.explicit_bounds, payload.explicit_bounds);
        self.scale.append_option(payload.scale);
        self.zero_count.append_option(payload.zero_count);
        self.positive_offset.append_option(payload.positive_offset);
        append_list(&mut self.positive_bucket_counts, payload.positive_bucket_counts);
        self.negative_offset.append_option(payload.negative_offset);
        append_list(&mut self.negative_bucket_counts, payload.negative_bucket_counts);
        append_list(&mut self.quantile_values, payload.quantile_values);
        append_list(&mut self.quantile_quantiles, payload.quantile_quantiles);
        self.min.append_option(payload.min);
        self.max.append_option(payload.max);

        Ok(())
    }

    pub fn finish(mut self) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(self.timestamp.finish()),
            Arc::new(self.service_name.finish()),
            Arc::new(self.metric_name.finish()),
            Arc::new(self.metric_description.finish()),
            Arc::new(self.metric_unit.finish()),
            Arc::new(self.resource_attributes.finish()),
            Arc::new(self.scope_name.finish()),
            Arc::new(self.scope_version.finish()),
            Arc::new(self.attributes.finish()),
            Arc::new(self.metric_type.finish()),
            Arc::new(self.value.finish()),
            Arc::new(self.aggregation_temporality.finish()),
            Arc::new(self.is_monotonic.finish()),
            Arc::new(self.count.finish()),
            Arc::new(self.sum.finish()),
            Arc::new(self.bucket_counts.finish()),
            Arc::new(self.explicit_bounds.finish()),
            Arc::new(self.scale.finish()),
            Arc::new(self.zero_count.finish()),
            Arc::new(self.positive_offset.finish()),
            Arc::new(self.positive_bucket_counts.finish()),
            Arc::new(self.negative_offset.finish()),
            Arc::new(self.negative_bucket_counts.finish()),
            Arc::new(self.quantile_values.finish()),
            Arc::new(self.quantile_quantiles.finish()),
            Arc::new(self.min.finish()),
            Arc::new(self.max.finish()),
        ];
        RecordBatch::try_new(self.schema, columns)
    }
}
