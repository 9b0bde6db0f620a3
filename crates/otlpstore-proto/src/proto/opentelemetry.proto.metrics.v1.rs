/// MetricsData represents the metrics data that can be stored in a persistent
/// storage, OR can be embedded by other protocols that transfer OTLP metrics
/// data but do not implement the OTLP protocol.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct MetricsData {
    #[prost(message, repeated, tag="1")]
    pub resource_metrics: ::prost::alloc::vec::Vec<ResourceMetrics>,
}
/// A collection of ScopeMetrics from a Resource.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct ResourceMetrics {
    #[prost(message, optional, tag="1")]
    pub resource: ::core::option::Option<super::super::resource::v1::Resource>,
    #[prost(message, repeated, tag="2")]
    pub scope_metrics: ::prost::alloc::vec::Vec<ScopeMetrics>,
    #[prost(string, tag="3")]
    pub schema_url: ::prost::alloc::string::String,
}
/// A collection of Metrics produced by an Scope.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct ScopeMetrics {
    #[prost(message, optional, tag="1")]
    pub scope: ::core::option::Option<super::super::common::v1::InstrumentationScope>,
    #[prost(message, repeated, tag="2")]
    pub metrics: ::prost::alloc::vec::Vec<Metric>,
    #[prost(string, tag="3")]
    pub schema_url: ::prost::alloc::string::String,
}
/// Defines a Metric which has one or more timeseries. The data field holds one of
/// the five supported point shapes.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct Metric {
    /// name of the metric.
    #[prost(string, tag="1")]
    pub name: ::prost::alloc::string::String,
    /// description of the metric, which can be used in documentation.
    #[prost(string, tag="2")]
    pub description: ::prost::alloc::string::String,
    /// unit in which the metric value is reported. Follows the format
    /// described by <https://unitsofmeasure.org/ucum.html>.
    #[prost(string, tag="3")]
    pub unit: ::prost::alloc::string::String,
    /// Additional metadata attributes that describe the metric. \[Optional\].
    #[prost(message, repeated, tag="12")]
    pub metadata: ::prost::alloc::vec::Vec<super::super::common::v1::KeyValue>,
    /// Data determines the aggregation type (if any) of the metric, what is the
    /// reported value type for the data points, as well as the relatationship to
    /// the time interval over which they are reported.
    #[prost(oneof="metric::Data", tags="5, 7, 9, 10, 11")]
    pub data: ::core::option::Option<metric::Data>,
}
/// Nested message and enum types in `Metric`.
pub mod metric {
    #[derive(Clone, PartialEq, ::prost::Oneof, ::serde::Serialize, ::serde::Deserialize)]
    pub enum Data {
        #[prost(message, tag="5")]
        Gauge(super::Gauge),
        #[prost(message, tag="7")]
        Sum(super::Sum),
        #[prost(message, tag="9")]
        Histogram(super::Histogram),
        #[prost(message, tag="10")]
        ExponentialHistogram(super::ExponentialHistogram),
        #[prost(message, tag="11")]
        Summary(super::Summary),
    }
}
/// Gauge represents the type of a scalar metric that always exports the
/// "current value" for every data point.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct Gauge {
    #[prost(message, repeated, tag="1")]
    pub data_points: ::prost::alloc::vec::Vec<NumberDataPoint>,
}
/// Sum represents the type of a scalar metric that is calculated as a sum of all
/// reported measurements over a time interval.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct Sum {
    #[prost(message, repeated, tag="1")]
    pub data_points: ::prost::alloc::vec::Vec<NumberDataPoint>,
    /// aggregation_temporality describes if the aggregator reports delta changes
    /// since last report time, or cumulative changes since a fixed start time.
    #[prost(enumeration="AggregationTemporality", tag="2")]
    pub aggregation_temporality: i32,
    /// If "true" means that the sum is monotonic.
    #[prost(bool, tag="3")]
    pub is_monotonic: bool,
}
/// Histogram represents the type of a metric that is calculated by aggregating
/// as a Histogram of all reported measurements over a time interval.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct Histogram {
    #[prost(message, repeated, tag="1")]
    pub data_points: ::prost::alloc::vec::Vec<HistogramDataPoint>,
    #[prost(enumeration="AggregationTemporality", tag="2")]
    pub aggregation_temporality: i32,
}
/// ExponentialHistogram represents the type of a metric that is calculated by aggregating
/// as a ExponentialHistogram of all reported double measurements over a time interval.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct ExponentialHistogram {
    #[prost(message, repeated, tag="1")]
    pub data_points: ::prost::alloc::vec::Vec<ExponentialHistogramDataPoint>,
    #[prost(enumeration="AggregationTemporality", tag="2")]
    pub aggregation_temporality: i32,
}
/// Summary metric data are used to convey quantile summaries.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct Summary {
    #[prost(message, repeated, tag="1")]
    pub data_points: ::prost::alloc::vec::Vec<SummaryDataPoint>,
}
/// NumberDataPoint is a single data point in a timeseries that describes the
/// time-varying scalar value of a metric.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct NumberDataPoint {
    /// The set of key/value pairs that uniquely identify the timeseries from
    /// where this point belongs.
    #[prost(message, repeated, tag="7")]
    pub attributes: ::prost::alloc::vec::Vec<super::super::common::v1::KeyValue>,
    #[prost(fixed64, tag="2")]
    pub start_time_unix_nano: u64,
    #[prost(fixed64, tag="3")]
    pub time_unix_nano: u64,
    /// (Optional) List of exemplars collected from
    /// measurements that were used to form the data point
    #[prost(message, repeated, tag="5")]
    pub exemplars: ::prost::alloc::vec::Vec<Exemplar>,
    #[prost(uint32, tag="8")]
    pub flags: u32,
    /// The value itself.  A point is considered invalid when one of the recognized
    /// value fields is not present inside this oneof.
    #[prost(oneof="number_data_point::Value", tags="4, 6")]
    pub value: ::core::option::Option<number_data_point::Value>,
}
/// Nested message and enum types in `NumberDataPoint`.
pub mod number_data_point {
    #[derive(Clone, Copy, PartialEq, ::prost::Oneof, ::serde::Serialize, ::serde::Deserialize)]
    pub enum Value {
        #[prost(double, tag="4")]
        #[serde(deserialize_with = "crate::serde_f64::deserialize")]
        AsDouble(f64),
        #[prost(sfixed64, tag="6")]
        AsInt(i64),
    }
}
/// HistogramDataPoint is a single data point in a timeseries that describes the
/// time-varying values of a Histogram.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct HistogramDataPoint {
    #[prost(message, repeated, tag="9")]
    pub attributes: ::prost::alloc::vec::Vec<super::super::common::v1::KeyValue>,
    #[prost(fixed64, tag="2")]
    pub start_time_unix_nano: u64,
    #[prost(fixed64, tag="3")]
    pub time_unix_nano: u64,
    /// count is the number of values in the population. Must be non-negative.
    #[prost(fixed64, tag="4")]
    pub count: u64,
    /// sum of the values in the population.
    #[prost(double, optional, tag="5")]
    #[serde(deserialize_with = "crate::serde_f64::option")]
    pub sum: ::core::option::Option<f64>,
    /// bucket_counts is an optional field contains the count values of histogram
    /// for each bucket.
    #[prost(fixed64, repeated, tag="6")]
    pub bucket_counts: ::prost::alloc::vec::Vec<u64>,
    /// explicit_bounds specifies buckets with explicitly defined bounds for values.
    #[prost(double, repeated, tag="7")]
    #[serde(deserialize_with = "crate::serde_f64::vec")]
    pub explicit_bounds: ::prost::alloc::vec::Vec<f64>,
    #[prost(message, repeated, tag="8")]
    pub exemplars: ::prost::alloc::vec::Vec<Exemplar>,
    #[prost(uint32, tag="10")]
    pub flags: u32,
    /// min is the minimum value over (start_time, end_time].
    #[prost(double, optional, tag="11")]
    #[serde(deserialize_with = "crate::serde_f64::option")]
    pub min: ::core::option::Option<f64>,
    /// max is the maximum value over (start_time, end_time].
    #[prost(double, optional, tag="12")]
    #[serde(deserialize_with = "crate::serde_f64::option")]
    pub max: ::core::option::Option<f64>,
}
/// ExponentialHistogramDataPoint is a single data point in a timeseries that describes the
/// time-varying values of a ExponentialHistogram of double values.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct ExponentialHistogramDataPoint {
    #[prost(message, repeated, tag="1")]
    pub attributes: ::prost::alloc::vec::Vec<super::super::common::v1::KeyValue>,
    #[prost(fixed64, tag="2")]
    pub start_time_unix_nano: u64,
    #[prost(fixed64, tag="3")]
    pub time_unix_nano: u64,
    #[prost(fixed64, tag="4")]
    pub count: u64,
    #[prost(double, optional, tag="5")]
    #[serde(deserialize_with = "crate::serde_f64::option")]
    pub sum: ::core::option::Option<f64>,
    /// scale describes the resolution of the histogram.
    #[prost(sint32, tag="6")]
    pub scale: i32,
    /// zero_count is the count of values that are either exactly zero or
    /// within the region considered zero by the instrumentation at the
    /// tolerated degree of precision.
    #[prost(fixed64, tag="7")]
    pub zero_count: u64,
    /// positive carries the positive range of exponential bucket counts.
    #[prost(message, optional, tag="8")]
    pub positive: ::core::option::Option<exponential_histogram_data_point::Buckets>,
    /// negative carries the negative range of exponential bucket counts.
    #[prost(message, optional, tag="9")]
    pub negative: ::core::option::Option<exponential_histogram_data_point::Buckets>,
    #[prost(uint32, tag="10")]
    pub flags: u32,
    #[prost(message, repeated, tag="11")]
    pub exemplars: ::prost::alloc::vec::Vec<Exemplar>,
    #[prost(double, optional, tag="12")]
    #[serde(deserialize_with = "crate::serde_f64::option")]
    pub min: ::core::option::Option<f64>,
    #[prost(double, optional, tag="13")]
    #[serde(deserialize_with = "crate::serde_f64::option")]
    pub max: ::core::option::Option<f64>,
    #[prost(double, tag="14")]
    #[serde(deserialize_with = "crate::serde_f64::deserialize")]
    pub zero_threshold: f64,
}
/// Nested message and enum types in `ExponentialHistogramDataPoint`.
pub mod exponential_histogram_data_point {
    /// Buckets are a set of bucket counts, encoded in a contiguous array
    /// of counts.
    #[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
    #[serde(default)]
    pub struct Buckets {
        /// Offset is the bucket index of the first entry in the bucket_counts array.
        #[prost(sint32, tag="1")]
        pub offset: i32,
        /// bucket_counts is an array of count values, where bucket_counts\[i\] carries
        /// the count of the bucket at index (offset+i).
        #[prost(uint64, repeated, tag="2")]
        pub bucket_counts: ::prost::alloc::vec::Vec<u64>,
    }
}
/// SummaryDataPoint is a single data point in a timeseries that describes the
/// time-varying values of a Summary metric.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct SummaryDataPoint {
    #[prost(message, repeated, tag="7")]
    pub attributes: ::prost::alloc::vec::Vec<super::super::common::v1::KeyValue>,
    #[prost(fixed64, tag="2")]
    pub start_time_unix_nano: u64,
    #[prost(fixed64, tag="3")]
    pub time_unix_nano: u64,
    #[prost(fixed64, tag="4")]
    pub count: u64,
    #[prost(double, tag="5")]
    #[serde(deserialize_with = "crate::serde_f64::deserialize")]
    pub sum: f64,
    /// (Optional) list of values at different quantiles of the distribution calculated
    /// from the current snapshot.
    #[prost(message, repeated, tag="6")]
    pub quantile_values: ::prost::alloc::vec::Vec<summary_data_point::ValueAtQuantile>,
    #[prost(uint32, tag="8")]
    pub flags: u32,
}
/// Nested message and enum types in `SummaryDataPoint`.
pub mod summary_data_point {
    /// Represents the value at a given quantile of a distribution.
    #[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
    #[serde(default)]
    pub struct ValueAtQuantile {
        /// The quantile of a distribution. Must be in the interval
        /// \[0.0, 1.0\].
        #[prost(double, tag="1")]
        #[serde(deserialize_with = "crate::serde_f64::deserialize")]
        pub quantile: f64,
        /// The value at the given quantile of a distribution.
        #[prost(double, tag="2")]
        #[serde(deserialize_with = "crate::serde_f64::deserialize")]
        pub value: f64,
    }
}
/// A representation of an exemplar, which is a sample input measurement.
#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct Exemplar {
    #[prost(message, repeated, tag="7")]
    pub filtered_attributes: ::prost::alloc::vec::Vec<super::super::common::v1::KeyValue>,
    #[prost(fixed64, tag="2")]
    pub time_unix_nano: u64,
    #[prost(bytes="vec", tag="4")]
    pub span_id: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes="vec", tag="5")]
    pub trace_id: ::prost::alloc::vec::Vec<u8>,
    #[prost(oneof="exemplar::Value", tags="3, 6")]
    pub value: ::core::option::Option<exemplar::Value>,
}
/// Nested message and enum types in `Exemplar`.
pub mod exemplar {
    #[derive(Clone, Copy, PartialEq, ::prost::Oneof, ::serde::Serialize, ::serde::Deserialize)]
    pub enum Value {
        #[prost(double, tag="3")]
        #[serde(deserialize_with = "crate::serde_f64::deserialize")]
        AsDouble(f64),
        #[prost(sfixed64, tag="6")]
        AsInt(i64),
    }
}
/// AggregationTemporality defines how a metric aggregator reports aggregated
/// values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AggregationTemporality {
    /// UNSPECIFIED is the default AggregationTemporality, it MUST not be used.
    Unspecified = 0,
    /// DELTA is an AggregationTemporality for a metric aggregator which reports
    /// changes since last report time.
    Delta = 1,
    /// CUMULATIVE is an AggregationTemporality for a metric aggregator which
    /// reports changes since a fixed start time.
    Cumulative = 2,
}
impl AggregationTemporality {
    /// String value of the enum field names used in the ProtoBuf definition.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            AggregationTemporality::Unspecified => "AGGREGATION_TEMPORALITY_UNSPECIFIED",
            AggregationTemporality::Delta => "AGGREGATION_TEMPORALITY_DELTA",
            AggregationTemporality::Cumulative => "AGGREGATION_TEMPORALITY_CUMULATIVE",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "AGGREGATION_TEMPORALITY_UNSPECIFIED" => Some(Self::Unspecified),
            "AGGREGATION_TEMPORALITY_DELTA" => Some(Self::Delta),
            "AGGREGATION_TEMPORALITY_CUMULATIVE" => Some(Self::Cumulative),
            _ => None,
        }
    }
}
