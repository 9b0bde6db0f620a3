//! Per-chunk zone maps: timestamp bounds plus single-value markers for the service
//! and metric name columns.

use otlpstore_core::TelemetryRow;

/// Tracks whether every non-null value seen in a column is the same.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueMarker {
    /// First non-null value observed.
    pub value: Option<String>,
    /// More than one distinct non-null value has been observed.
    pub mixed: bool,
    pub has_nulls: bool,
}

impl ValueMarker {
    pub fn observe(&mut self, value: Option<&str>) {
        match value {
            None => self.has_nulls = true,
            Some(_) if self.mixed => {}
            Some(v) => match &self.value {
                None => self.value = Some(v.to_string()),
                Some(seen) if seen != v => self.mixed = true,
                Some(_) => {}
            },
        }
    }

    /// The column's only value, when the chunk holds exactly one distinct non-null value.
    pub fn single_value(&self) -> Option<&str> {
        if self.mixed {
            None
        } else {
            self.value.as_deref()
        }
    }

    /// True when no non-null value was observed.
    pub fn all_null(&self) -> bool {
        self.value.is_none()
    }
}

/// Column indices a zone map summarises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneColumns {
    pub timestamp: usize,
    pub service: usize,
    pub metric: Option<usize>,
}

impl ZoneColumns {
    pub fn of<R: TelemetryRow>() -> Self {
        Self {
            timestamp: R::TIMESTAMP_COLUMN,
            service: R::SERVICE_NAME_COLUMN,
            metric: R::METRIC_NAME_COLUMN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneMap {
    pub row_count: usize,
    /// Smallest timestamp in the chunk; `i64::MAX` when empty.
    pub ts_min: i64,
    /// Largest timestamp in the chunk; `i64::MIN` when empty.
    pub ts_max: i64,
    pub service: ValueMarker,
    pub metric: Option<ValueMarker>,
}

impl ZoneMap {
    pub fn from_rows<R: TelemetryRow>(rows: &[R]) -> Self {
        let mut zone = ZoneMap {
            row_count: rows.len(),
            ts_min: i64::MAX,
            ts_max: i64::MIN,
            service: ValueMarker::default(),
            metric: R::METRIC_NAME_COLUMN.map(|_| ValueMarker::default()),
        };
        for row in rows {
            let ts = row.timestamp();
            zone.ts_min = zone.ts_min.min(ts);
            zone.ts_max = zone.ts_max.max(ts);
            zone.service.observe(Some(row.service_name()));
            if let Some(marker) = zone.metric.as_mut() {
                marker.observe(row.metric_name());
            }
        }
        zone
    }

    /// Marker kept for `column`, if that column is zone-mapped.
    pub fn marker(&self, columns: &ZoneColumns, column: usize) -> Option<&ValueMarker> {
        if column == columns.service {
            Some(&self.service)
        } else if Some(column) == columns.metric {
            self.metric.as_ref()
        } else {
            None
        }
    }
}
