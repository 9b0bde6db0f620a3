//! Signal and metric-shape discriminators with their fixed name tables.

use std::fmt;
use std::str::FromStr;

/// The three OTLP signal families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Traces,
    Logs,
    Metrics,
}

impl SignalKind {
    pub const ALL: [SignalKind; 3] = [SignalKind::Traces, SignalKind::Logs, SignalKind::Metrics];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Traces => "traces",
            SignalKind::Logs => "logs",
            SignalKind::Metrics => "metrics",
        }
    }

    /// Top-level array every canonical JSON document of this signal must carry.
    pub const fn json_root_field(&self) -> &'static str {
        match self {
            SignalKind::Traces => "resourceSpans",
            SignalKind::Logs => "resourceLogs",
            SignalKind::Metrics => "resourceMetrics",
        }
    }

    /// Same field in prost (snake_case) spelling.
    pub const fn proto_root_field(&self) -> &'static str {
        match self {
            SignalKind::Traces => "resource_spans",
            SignalKind::Logs => "resource_logs",
            SignalKind::Metrics => "resource_metrics",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "traces" | "trace" | "spans" => Ok(SignalKind::Traces),
            "logs" | "log" => Ok(SignalKind::Logs),
            "metrics" | "metric" => Ok(SignalKind::Metrics),
            other => Err(format!(
                "unknown signal '{other}'; expected one of: traces, logs, metrics"
            )),
        }
    }
}

/// Discriminator stored in the `MetricType` column of the union metric schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    Gauge,
    Sum,
    Histogram,
    ExponentialHistogram,
    Summary,
}

impl MetricType {
    pub const ALL: [MetricType; 5] = [
        MetricType::Gauge,
        MetricType::Sum,
        MetricType::Histogram,
        MetricType::ExponentialHistogram,
        MetricType::Summary,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Sum => "sum",
            MetricType::Histogram => "histogram",
            MetricType::ExponentialHistogram => "exponential_histogram",
            MetricType::Summary => "summary",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown metric type '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_type_names_round_trip() {
        for kind in MetricType::ALL {
            assert_eq!(kind.as_str().parse::<MetricType>().unwrap(), kind);
        }
        assert!("histogram2".parse::<MetricType>().is_err());
    }

    #[test]
    fn signal_kind_accepts_singular_forms() {
        assert_eq!("trace".parse::<SignalKind>().unwrap(), SignalKind::Traces);
        assert_eq!("LOGS".parse::<SignalKind>().unwrap(), SignalKind::Logs);
        assert_eq!(SignalKind::Metrics.json_root_field(), "resourceMetrics");
    }
}
