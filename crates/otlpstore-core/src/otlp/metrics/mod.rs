//! Metric rows: one per data point, all five shapes on the union schema.

mod to_arrow;

use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use otlpstore_proto::opentelemetry::proto::collector::metrics::v1::ExportMetricsServiceRequest;
use otlpstore_proto::opentelemetry::proto::metrics::v1::{
    exponential_histogram_data_point::Buckets, metric::Data, number_data_point, Metric,
    NumberDataPoint,
};

use crate::otlp::common::codec::{attributes_to_map, nanos_to_micros, Attributes};
use crate::otlp::common::context::{ResourceContext, ScopeContext};
use crate::row::TelemetryRow;
use crate::schema::metrics::{metrics_schema, METRIC_NAME_COLUMN, SERVICE_NAME_COLUMN};
use crate::signal::{MetricType, SignalKind};

pub use to_arrow::MetricBatchBuilder;

/// Metric-level fields shared by every data point of one metric.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetricContext {
    pub name: String,
    pub description: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub resource: Arc<ResourceContext>,
    pub scope: Arc<ScopeContext>,
    pub metric: Arc<MetricContext>,
    /// Data point time, microseconds since epoch.
    pub timestamp: i64,
    pub attributes: Attributes,
    pub data: MetricData,
}

/// Shape-specific payload of a data point.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricData {
    Gauge {
        value: Option<f64>,
    },
    Sum {
        value: Option<f64>,
        aggregation_temporality: i32,
        is_monotonic: bool,
    },
    Histogram {
        count: u64,
        sum: Option<f64>,
        bucket_counts: Vec<u64>,
        explicit_bounds: Vec<f64>,
        min: Option<f64>,
        max: Option<f64>,
    },
    ExponentialHistogram {
        count: u64,
        sum: Option<f64>,
        scale: i32,
        zero_count: u64,
        positive: ExponentialBuckets,
        negative: ExponentialBuckets,
        min: Option<f64>,
        max: Option<f64>,
    },
    Summary {
        count: u64,
        sum: f64,
        quantile_values: Vec<f64>,
        quantiles: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExponentialBuckets {
    pub offset: i32,
    pub bucket_counts: Vec<u64>,
}

impl From<Option<&Buckets>> for ExponentialBuckets {
    fn from(buckets: Option<&Buckets>) -> Self {
        buckets
            .map(|b| Self {
                offset: b.offset,
                bucket_counts: b.bucket_counts.clone(),
            })
            .unwrap_or_default()
    }
}

impl MetricData {
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricData::Gauge { .. } => MetricType::Gauge,
            MetricData::Sum { .. } => MetricType::Sum,
            MetricData::Histogram { .. } => MetricType::Histogram,
            MetricData::ExponentialHistogram { .. } => MetricType::ExponentialHistogram,
            MetricData::Summary { .. } => MetricType::Summary,
        }
    }
}

impl MetricRow {
    pub fn metric_type(&self) -> MetricType {
        self.data.metric_type()
    }
}

fn number_value(point: &NumberDataPoint) -> Option<f64> {
    match point.value? {
        number_data_point::Value::AsDouble(value) => Some(value),
        number_data_point::Value::AsInt(value) => Some(value as f64),
    }
}

/// Shared per-metric state used while expanding one metric into rows.
struct RowContext<'a> {
    resource: &'a Arc<ResourceContext>,
    scope: &'a Arc<ScopeContext>,
    metric: Arc<MetricContext>,
}

impl RowContext<'_> {
    fn row(&self, time_unix_nano: u64, attributes: Attributes, data: MetricData) -> MetricRow {
        MetricRow {
            resource: Arc::clone(self.resource),
            scope: Arc::clone(self.scope),
            metric: Arc::clone(&self.metric),
            timestamp: nanos_to_micros(time_unix_nano),
            attributes,
            data,
        }
    }
}

fn extend_from_metric(metric: &Metric, ctx: &RowContext<'_>, rows: &mut Vec<MetricRow>) {
    match &metric.data {
        Some(Data::Gauge(gauge)) => rows.extend(gauge.data_points.iter().map(|point| {
            ctx.row(
                point.time_unix_nano,
                attributes_to_map(&point.attributes),
                MetricData::Gauge {
                    value: number_value(point),
                },
            )
        })),
        Some(Data::Sum(sum)) => rows.extend(sum.data_points.iter().map(|point| {
            ctx.row(
                point.time_unix_nano,
                attributes_to_map(&point.attributes),
                MetricData::Sum {
                    value: number_value(point),
                    aggregation_temporality: sum.aggregation_temporality,
                    is_monotonic: sum.is_monotonic,
                },
            )
        })),
        Some(Data::Histogram(histogram)) => {
            rows.extend(histogram.data_points.iter().map(|point| {
                ctx.row(
                    point.time_unix_nano,
                    attributes_to_map(&point.attributes),
                    MetricData::Histogram {
                        count: point.count,
                        sum: point.sum,
                        bucket_counts: point.bucket_counts.clone(),
                        explicit_bounds: point.explicit_bounds.clone(),
                        min: point.min,
                        max: point.max,
                    },
                )
            }))
        }
        Some(Data::ExponentialHistogram(histogram)) => {
            rows.extend(histogram.data_points.iter().map(|point| {
                ctx.row(
                    point.time_unix_nano,
                    attributes_to_map(&point.attributes),
                    MetricData::ExponentialHistogram {
                        count: point.count,
                        sum: point.sum,
                        scale: point.scale,
                        zero_count: point.zero_count,
                        positive: point.positive.as_ref().into(),
                        negative: point.negative.as_ref().into(),
                        min: point.min,
                        max: point.max,
                    },
                )
            }))
        }
        Some(Data::Summary(summary)) => rows.extend(summary.data_points.iter().map(|point| {
            ctx.row(
                point.time_unix_nano,
                attributes_to_map(&point.attributes),
                MetricData::Summary {
                    count: point.count,
                    sum: point.sum,
                    quantile_values: point.quantile_values.iter().map(|q| q.value).collect(),
                    quantiles: point.quantile_values.iter().map(|q| q.quantile).collect(),
                },
            )
        })),
        None => {}
    }
}

impl TelemetryRow for MetricRow {
    type Request = ExportMetricsServiceRequest;

    const SIGNAL: SignalKind = SignalKind::Metrics;
    const SERVICE_NAME_COLUMN: usize = SERVICE_NAME_COLUMN;
    const METRIC_NAME_COLUMN: Option<usize> = Some(METRIC_NAME_COLUMN);

    fn schema() -> SchemaRef {
        metrics_schema()
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn service_name(&self) -> &str {
        &self.resource.service_name
    }

    fn metric_name(&self) -> Option<&str> {
        Some(&self.metric.name)
    }

    fn extend_from_request(request: &Self::Request, rows: &mut Vec<Self>) {
        for resource_metrics in &request.resource_metrics {
            let resource = ResourceContext::extract(
                resource_metrics.resource.as_ref(),
                &resource_metrics.schema_url,
            );
            for scope_metrics in &resource_metrics.scope_metrics {
                let scope =
                    ScopeContext::extract(scope_metrics.scope.as_ref(), &scope_metrics.schema_url);
                for metric in &scope_metrics.metrics {
                    let ctx = RowContext {
                        resource: &resource,
                        scope: &scope,
                        metric: Arc::new(MetricContext {
                            name: metric.name.clone(),
                            description: metric.description.clone(),
                            unit: metric.unit.clone(),
                        }),
                    };
                    extend_from_metric(metric, &ctx, rows);
                }
            }
        }
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, ArrowError> {
        let mut builder = MetricBatchBuilder::with_capacity(rows.len());
        for row in rows {
            builder.append(row)?;
        }
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::metrics::{PAYLOAD_COLUMNS, METRIC_TYPE_COLUMN, VALUE};
    use arrow::array::{Array, Float64Array, StringArray};
    use otlpstore_proto::opentelemetry::proto::metrics::v1::{
        summary_data_point::ValueAtQuantile, ExponentialHistogram, ExponentialHistogramDataPoint,
        Gauge, Histogram, HistogramDataPoint, ResourceMetrics, ScopeMetrics, Sum, Summary,
        SummaryDataPoint,
    };

    fn metric(name: &str, data: Data) -> Metric {
        Metric {
            name: name.to_string(),
            data: Some(data),
            ..Default::default()
        }
    }

    fn request_with(metrics: Vec<Metric>) -> ExportMetricsServiceRequest {
        ExportMetricsServiceRequest {
            resource_metrics: vec![ResourceMetrics {
                scope_metrics: vec![ScopeMetrics {
                    metrics,
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    fn number_point(value: number_data_point::Value) -> NumberDataPoint {
        NumberDataPoint {
            time_unix_nano: 1_000_000,
            value: Some(value),
            ..Default::default()
        }
    }

    fn every_shape() -> ExportMetricsServiceRequest {
        request_with(vec![
            metric(
                "g",
                Data::Gauge(Gauge {
                    data_points: vec![number_point(number_data_point::Value::AsDouble(1.5))],
                }),
            ),
            metric(
                "s",
                Data::Sum(Sum {
                    data_points: vec![number_point(number_data_point::Value::AsInt(7))],
                    aggregation_temporality: 2,
                    is_monotonic: true,
                }),
            ),
            metric(
                "h",
                Data::Histogram(Histogram {
                    data_points: vec![HistogramDataPoint {
                        count: 3,
                        sum: Some(6.0),
                        bucket_counts: vec![1, 2],
                        explicit_bounds: vec![2.5],
                        min: Some(1.0),
                        max: Some(3.0),
                        ..Default::default()
                    }],
                    aggregation_temporality: 1,
                }),
            ),
            metric(
                "e",
                Data::ExponentialHistogram(ExponentialHistogram {
                    data_points: vec![ExponentialHistogramDataPoint {
                        count: 4,
                        sum: Some(10.0),
                        scale: 2,
                        zero_count: 1,
                        positive: Some(Buckets {
                            offset: -1,
                            bucket_counts: vec![1, 2],
                        }),
                        negative: Some(Buckets {
                            offset: 0,
                            bucket_counts: vec![],
                        }),
                        min: Some(0.0),
                        max: Some(5.0),
                        ..Default::default()
                    }],
                    aggregation_temporality: 1,
                }),
            ),
            metric(
                "q",
                Data::Summary(Summary {
                    data_points: vec![SummaryDataPoint {
                        count: 2,
                        sum: 3.0,
                        quantile_values: vec![
                            ValueAtQuantile {
                                quantile: 0.5,
                                value: 1.0,
                            },
                            ValueAtQuantile {
                                quantile: 0.99,
                                value: 2.0,
                            },
                        ],
                        ..Default::default()
                    }],
                }),
            ),
        ])
    }

    #[test]
    fn one_row_per_data_point_with_discriminator() {
        let rows = MetricRow::rows_from_request(&every_shape());
        let types: Vec<_> = rows.iter().map(|r| r.metric_type()).collect();
        assert_eq!(types, MetricType::ALL.to_vec());
        assert_eq!(rows[0].timestamp, 1_000);
        assert_eq!(rows[1].metric_name(), Some("s"));
        assert_eq!(
            rows[1].data,
            MetricData::Sum {
                value: Some(7.0),
                aggregation_temporality: 2,
                is_monotonic: true,
            }
        );
        match &rows[4].data {
            MetricData::Summary {
                quantile_values,
                quantiles,
                ..
            } => {
                assert_eq!(quantile_values, &vec![1.0, 2.0]);
                assert_eq!(quantiles, &vec![0.5, 0.99]);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn metric_without_payload_yields_no_rows() {
        let request = request_with(vec![Metric {
            name: "empty".to_string(),
            ..Default::default()
        }]);
        assert!(MetricRow::rows_from_request(&request).is_empty());
    }

    #[test]
    fn gauge_row_nulls_every_other_payload_column() {
        let request = request_with(vec![metric(
            "cpu",
            Data::Gauge(Gauge {
                data_points: vec![number_point(number_data_point::Value::AsDouble(42.5))],
            }),
        )]);
        let batch = MetricRow::to_record_batch(&MetricRow::rows_from_request(&request)).unwrap();

        let kind = batch
            .column(METRIC_TYPE_COLUMN)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(kind.value(0), "gauge");

        let value = batch
            .column(VALUE)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(value.value(0), 42.5);

        for idx in PAYLOAD_COLUMNS.into_iter().filter(|idx| *idx != VALUE) {
            let column = batch.column(idx);
            assert!(column.is_null(0), "column {idx} should be null");
            assert_eq!(column.data_type(), metrics_schema().field(idx).data_type());
        }
    }

    #[test]
    fn payload_columns_are_null_exactly_outside_the_row_shape() {
        let rows = MetricRow::rows_from_request(&every_shape());
        let batch = MetricRow::to_record_batch(&rows).unwrap();
        assert_eq!(batch.schema(), metrics_schema());

        for (row_idx, row) in rows.iter().enumerate() {
            let applicable = row.metric_type().payload_columns();
            for idx in PAYLOAD_COLUMNS {
                assert_eq!(
                    batch.column(idx).is_null(row_idx),
                    !applicable.contains(&idx),
                    "row {row_idx} ({}) column {}",
                    row.metric_type(),
                    metrics_schema().field(idx).name()
                );
            }
        }
    }
}
