// Scan engine
//
// Two tiers: each chunk is first judged from its zone map alone (skip it, take all
// of it, or check it row by row); only chunks needing a row check get a selection
// mask. Chunks taken whole are projected without copying.

use arrow::array::{ArrayRef, BooleanArray, Int64Array, RecordBatch, StringArray};
use arrow::compute::kernels::cmp::{eq, gt_eq, lt_eq};
use arrow::compute::{and, cast, filter_record_batch};
use arrow::datatypes::{DataType, SchemaRef};
use otlpstore_core::TelemetryRow;
use tracing::debug;

use crate::columnar::{Chunk, Snapshot, DEFAULT_CHUNK_ROWS};
use crate::error::ScanError;
use crate::zone::{ZoneColumns, ZoneMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Inclusive bounds on the timestamp column, in the schema's native unit.
    TimestampRange { min: Option<i64>, max: Option<i64> },
    /// Exact match on a string column.
    Equals { column: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRequest {
    /// Column indices to emit, in order; `None` emits every column.
    pub projection: Option<Vec<usize>>,
    pub predicates: Vec<Predicate>,
}

impl ScanRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, columns: Vec<usize>) -> Self {
        self.projection = Some(columns);
        self
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn timestamp_range(self, min: Option<i64>, max: Option<i64>) -> Self {
        self.with_predicate(Predicate::TimestampRange { min, max })
    }

    pub fn equals(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_predicate(Predicate::Equals {
            column: column.into(),
            value: value.into(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Use zone maps; when false every row of every chunk is evaluated.
    pub prune: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { prune: true }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanMetrics {
    pub chunks_total: usize,
    pub chunks_skipped: usize,
    /// Chunks emitted whole, without a selection mask.
    pub chunks_passthrough: usize,
    /// Chunks evaluated row by row.
    pub chunks_filtered: usize,
    pub rows_examined: usize,
    pub rows_emitted: usize,
}

#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
    pub metrics: ScanMetrics,
}

impl ScanOutput {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }
}

/// What the zone map says about one predicate for one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No row can match.
    Skip,
    /// Every row matches.
    AllRows,
    /// Rows must be checked individually.
    CheckRows,
}

/// A predicate bound to a column index.
#[derive(Debug, Clone)]
enum Bound {
    Timestamp {
        column: usize,
        min: i64,
        max: i64,
    },
    Equals {
        column: usize,
        value: String,
    },
}

impl Bound {
    fn verdict(&self, zone: &ZoneMap, columns: &ZoneColumns) -> Verdict {
        if zone.row_count == 0 {
            return Verdict::Skip;
        }
        match self {
            Bound::Timestamp { min, max, .. } => {
                if zone.ts_max < *min || zone.ts_min > *max {
                    Verdict::Skip
                } else if zone.ts_min >= *min && zone.ts_max <= *max {
                    Verdict::AllRows
                } else {
                    Verdict::CheckRows
                }
            }
            Bound::Equals { column, value } => match zone.marker(columns, *column) {
                None => Verdict::CheckRows,
                Some(marker) if marker.mixed => Verdict::CheckRows,
                Some(marker) => match marker.single_value() {
                    None => Verdict::Skip,
                    Some(single) if single != value => Verdict::Skip,
                    Some(_) if marker.has_nulls => Verdict::CheckRows,
                    Some(_) => Verdict::AllRows,
                },
            },
        }
    }

    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray, ScanError> {
        match self {
            Bound::Timestamp { column, min, max } => {
                let values = cast(batch.column(*column), &DataType::Int64)?;
                let lower = gt_eq(&values, &Int64Array::new_scalar(*min))?;
                let upper = lt_eq(&values, &Int64Array::new_scalar(*max))?;
                Ok(and(&lower, &upper)?)
            }
            Bound::Equals { column, value } => {
                let values: &ArrayRef = batch.column(*column);
                Ok(eq(values, &StringArray::new_scalar(value.as_str()))?)
            }
        }
    }
}

fn bind(schema: &SchemaRef, columns: &ZoneColumns, predicate: &Predicate) -> Result<Bound, ScanError> {
    match predicate {
        Predicate::TimestampRange { min, max } => {
            let field = schema.field(columns.timestamp);
            match field.data_type() {
                DataType::Timestamp(_, _) | DataType::Int64 => Ok(Bound::Timestamp {
                    column: columns.timestamp,
                    min: min.unwrap_or(i64::MIN),
                    max: max.unwrap_or(i64::MAX),
                }),
                other => Err(ScanError::NotATimestamp {
                    column: field.name().clone(),
                    data_type: other.clone(),
                }),
            }
        }
        Predicate::Equals { column, value } => {
            let index = schema
                .index_of(column)
                .map_err(|_| ScanError::UnknownColumn(column.clone()))?;
            match schema.field(index).data_type() {
                DataType::Utf8 => Ok(Bound::Equals {
                    column: index,
                    value: value.clone(),
                }),
                other => Err(ScanError::NotAString {
                    column: column.clone(),
                    data_type: other.clone(),
                }),
            }
        }
    }
}

fn check_projection(schema: &SchemaRef, projection: &[usize]) -> Result<(), ScanError> {
    let columns = schema.fields().len();
    match projection.iter().find(|idx| **idx >= columns) {
        Some(index) => Err(ScanError::ProjectionOutOfRange {
            index: *index,
            columns,
        }),
        None => Ok(()),
    }
}

fn project(batch: &RecordBatch, projection: Option<&[usize]>) -> Result<RecordBatch, ScanError> {
    match projection {
        Some(indices) => Ok(batch.project(indices)?),
        None => Ok(batch.clone()),
    }
}

/// Scan a snapshot, applying predicates and projection.
pub fn scan(
    snapshot: &Snapshot,
    request: &ScanRequest,
    options: ScanOptions,
) -> Result<ScanOutput, ScanError> {
    let schema = snapshot.schema();
    let projection = request.projection.as_deref();
    let output_schema = match projection {
        Some(indices) => {
            check_projection(schema, indices)?;
            SchemaRef::new(schema.project(indices)?)
        }
        None => SchemaRef::clone(schema),
    };

    let bounds = request
        .predicates
        .iter()
        .map(|p| bind(schema, snapshot.columns(), p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut metrics = ScanMetrics::default();
    let mut batches = Vec::new();

    for chunk in snapshot.chunks() {
        metrics.chunks_total += 1;
        match scan_chunk(chunk, &bounds, snapshot.columns(), options, &mut metrics)? {
            Some(selected) => {
                let selected = project(&selected, projection)?;
                if selected.num_rows() > 0 {
                    metrics.rows_emitted += selected.num_rows();
                    batches.push(selected);
                }
            }
            None => metrics.chunks_skipped += 1,
        }
    }

    debug!(
        chunks = metrics.chunks_total,
        skipped = metrics.chunks_skipped,
        passthrough = metrics.chunks_passthrough,
        filtered = metrics.chunks_filtered,
        rows = metrics.rows_emitted,
        "scan complete"
    );

    Ok(ScanOutput {
        schema: output_schema,
        batches,
        metrics,
    })
}

/// Rows of `chunk` matching every bound, or `None` when the chunk is skipped.
fn scan_chunk(
    chunk: &Chunk,
    bounds: &[Bound],
    columns: &ZoneColumns,
    options: ScanOptions,
    metrics: &mut ScanMetrics,
) -> Result<Option<RecordBatch>, ScanError> {
    if chunk.num_rows() == 0 {
        return Ok(None);
    }

    let residual: Vec<&Bound> = if options.prune {
        let mut residual = Vec::with_capacity(bounds.len());
        for bound in bounds {
            match bound.verdict(chunk.zone(), columns) {
                Verdict::Skip => return Ok(None),
                Verdict::AllRows => {}
                Verdict::CheckRows => residual.push(bound),
            }
        }
        residual
    } else {
        bounds.iter().collect()
    };

    if residual.is_empty() {
        metrics.chunks_passthrough += 1;
        return Ok(Some(chunk.batch().clone()));
    }

    metrics.chunks_filtered += 1;
    metrics.rows_examined += chunk.num_rows();

    let mut selection = residual[0].mask(chunk.batch())?;
    for bound in &residual[1..] {
        selection = and(&selection, &bound.mask(chunk.batch())?)?;
    }
    if selection.true_count() == 0 {
        return Ok(Some(chunk.batch().slice(0, 0)));
    }
    Ok(Some(filter_record_batch(chunk.batch(), &selection)?))
}

/// Scan rows held outside a columnar buffer (for example a row ring buffer snapshot).
pub fn scan_rows<R: TelemetryRow>(rows: &[R], request: &ScanRequest) -> Result<ScanOutput, ScanError> {
    let snapshot = Snapshot::from_rows(rows, DEFAULT_CHUNK_ROWS)?;
    scan(&snapshot, request, ScanOptions::default())
}
