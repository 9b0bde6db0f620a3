// Columnar ring buffer
//
// Rows collect in an open tail; a full tail is sealed into an immutable record batch
// with its zone map and appended to the sealed list. The sealed list and the tail are
// published together behind one `RwLock` and are both immutable once published, so a
// reader holds the read lock only long enough to clone two pointers. Writers are
// serialized by their own mutex and swap in the next state once per insert call.
//
// Retention: at most `max_chunks` sealed chunks and `max_rows` rows in total. When the
// row bound is exceeded the oldest chunk is sliced, or dropped once nothing is left.

use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};

use arrow::array::RecordBatch;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use otlpstore_core::TelemetryRow;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{BufferError, ScanError};
use crate::scan::{scan, ScanOptions, ScanOutput, ScanRequest};
use crate::zone::{ZoneColumns, ZoneMap};

pub const DEFAULT_CHUNK_ROWS: usize = 2048;
pub const DEFAULT_MAX_CHUNKS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnarOptions {
    /// Rows per sealed chunk. Never more than `max_rows`.
    pub chunk_rows: usize,
    /// Sealed chunks retained before the oldest is evicted.
    pub max_chunks: usize,
    /// Rows retained across sealed chunks and the open tail.
    pub max_rows: usize,
}

impl Default for ColumnarOptions {
    fn default() -> Self {
        Self {
            chunk_rows: DEFAULT_CHUNK_ROWS,
            max_chunks: DEFAULT_MAX_CHUNKS,
            max_rows: DEFAULT_CHUNK_ROWS * DEFAULT_MAX_CHUNKS,
        }
    }
}

impl ColumnarOptions {
    /// Options retaining exactly the newest `rows` rows in chunks of at most
    /// `chunk_rows`.
    pub fn for_capacity(rows: usize, chunk_rows: usize) -> Self {
        let rows = rows.max(1);
        let chunk_rows = chunk_rows.clamp(1, rows);
        Self {
            chunk_rows,
            max_chunks: rows.div_ceil(chunk_rows),
            max_rows: rows,
        }
    }
}

/// An immutable run of rows with its zone map.
#[derive(Debug)]
pub struct Chunk {
    batch: RecordBatch,
    zone: ZoneMap,
}

impl Chunk {
    pub fn from_rows<R: TelemetryRow>(rows: &[R]) -> Result<Self, ArrowError> {
        Ok(Self {
            batch: R::to_record_batch(rows)?,
            zone: ZoneMap::from_rows(rows),
        })
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn zone(&self) -> &ZoneMap {
        &self.zone
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// The chunk without its `n` oldest rows, sharing the same buffers. Bounds and
    /// single-value markers that hold for every row also hold for the rest, so the
    /// zone map is kept with only the row count updated.
    fn skip_oldest(&self, n: usize) -> Self {
        let n = n.min(self.num_rows());
        let kept = self.num_rows() - n;
        Self {
            batch: self.batch.slice(n, kept),
            zone: ZoneMap {
                row_count: kept,
                ..self.zone.clone()
            },
        }
    }
}

/// Chunks visible at one instant, oldest first.
#[derive(Debug, Clone)]
pub struct Snapshot {
    schema: SchemaRef,
    columns: ZoneColumns,
    chunks: Vec<Arc<Chunk>>,
}

impl Snapshot {
    pub fn new(schema: SchemaRef, columns: ZoneColumns, chunks: Vec<Arc<Chunk>>) -> Self {
        Self {
            schema,
            columns,
            chunks,
        }
    }

    /// Split `rows` into chunks of `chunk_rows` without going through a buffer.
    pub fn from_rows<R: TelemetryRow>(rows: &[R], chunk_rows: usize) -> Result<Self, BufferError> {
        let chunks = rows
            .chunks(chunk_rows.max(1))
            .map(|part| Chunk::from_rows(part).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(R::schema(), ZoneColumns::of::<R>(), chunks))
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn columns(&self) -> &ZoneColumns {
        &self.columns
    }

    pub fn chunks(&self) -> &[Arc<Chunk>] {
        &self.chunks
    }

    pub fn num_rows(&self) -> usize {
        self.chunks.iter().map(|c| c.num_rows()).sum()
    }

    pub fn batches(&self) -> impl Iterator<Item = &RecordBatch> {
        self.chunks.iter().map(|c| c.batch())
    }
}

/// Rows of one insert call, linked to the runs inserted before it since the last seal.
struct Run<R> {
    rows: Vec<R>,
    prev: Option<Arc<Run<R>>>,
}

impl<R> Drop for Run<R> {
    fn drop(&mut self) {
        // Unlink iteratively so a long tail cannot overflow the stack.
        let mut prev = self.prev.take();
        while let Some(run) = prev {
            match Arc::try_unwrap(run) {
                Ok(mut run) => prev = run.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// Rows inserted since the last seal, materialised on first read.
struct Tail<R> {
    newest: Arc<Run<R>>,
    len: usize,
    chunk: OnceLock<Arc<Chunk>>,
}

impl<R: TelemetryRow> Tail<R> {
    fn extend(prev: Option<&Tail<R>>, rows: Vec<R>) -> Arc<Self> {
        let len = prev.map_or(0, |t| t.len) + rows.len();
        Arc::new(Self {
            newest: Arc::new(Run {
                rows,
                prev: prev.map(|t| Arc::clone(&t.newest)),
            }),
            len,
            chunk: OnceLock::new(),
        })
    }

    /// Every tail row, oldest first.
    fn rows(&self) -> Vec<R> {
        let mut runs = Vec::new();
        let mut run = Some(self.newest.as_ref());
        while let Some(current) = run {
            runs.push(&current.rows);
            run = current.prev.as_deref();
        }
        let mut rows = Vec::with_capacity(self.len);
        for run in runs.into_iter().rev() {
            rows.extend(run.iter().cloned());
        }
        rows
    }

    fn chunk(&self) -> Result<Arc<Chunk>, ArrowError> {
        if let Some(chunk) = self.chunk.get() {
            return Ok(Arc::clone(chunk));
        }
        let chunk = Arc::new(Chunk::from_rows(&self.rows())?);
        Ok(Arc::clone(self.chunk.get_or_init(|| chunk)))
    }
}

type SealedChunks = Arc<VecDeque<Arc<Chunk>>>;

/// What readers see: sealed chunks plus the open tail.
struct Published<R> {
    sealed: SealedChunks,
    tail: Option<Arc<Tail<R>>>,
    rows: usize,
}

impl<R> Published<R> {
    fn empty() -> Self {
        Self {
            sealed: Arc::new(VecDeque::new()),
            tail: None,
            rows: 0,
        }
    }
}

/// Capacity-bounded store of rows kept as zone-mapped Arrow chunks.
pub struct ColumnarRingBuffer<R: TelemetryRow> {
    options: ColumnarOptions,
    writer: Mutex<()>,
    state: RwLock<Published<R>>,
}

impl<R: TelemetryRow> ColumnarRingBuffer<R> {
    pub fn new(options: ColumnarOptions) -> Self {
        let max_rows = options.max_rows.max(1);
        Self {
            options: ColumnarOptions {
                chunk_rows: options.chunk_rows.clamp(1, max_rows),
                max_chunks: options.max_chunks.max(1),
                max_rows,
            },
            writer: Mutex::new(()),
            state: RwLock::new(Published::empty()),
        }
    }

    pub fn options(&self) -> ColumnarOptions {
        self.options
    }

    pub fn insert(&self, row: R) -> Result<(), BufferError> {
        self.insert_batch(std::iter::once(row))
    }

    /// Insert rows in order. Readers see either none or all of them; if a chunk cannot
    /// be assembled nothing from this call is kept.
    pub fn insert_batch<I>(&self, rows: I) -> Result<(), BufferError>
    where
        I: IntoIterator<Item = R>,
    {
        let _writer = self.writer.lock();
        let (sealed, mut tail) = {
            let state = self.state.read();
            (Arc::clone(&state.sealed), state.tail.clone())
        };

        let mut run = Vec::new();
        let mut fresh = Vec::new();
        for row in rows {
            run.push(row);
            if tail.as_ref().map_or(0, |t| t.len) + run.len() == self.options.chunk_rows {
                let mut chunk_rows = tail.take().map(|t| t.rows()).unwrap_or_default();
                chunk_rows.append(&mut run);
                fresh.push(Arc::new(Chunk::from_rows(&chunk_rows)?));
            }
        }
        if run.is_empty() && fresh.is_empty() {
            return Ok(());
        }
        if !run.is_empty() {
            tail = Some(Tail::extend(tail.as_deref(), run));
        }

        let tail_rows = tail.as_ref().map_or(0, |t| t.len);
        let sealed = self.retain(&sealed, fresh, tail_rows);
        let rows = sealed.iter().map(|c| c.num_rows()).sum::<usize>() + tail_rows;
        *self.state.write() = Published { sealed, tail, rows };
        Ok(())
    }

    /// Append `fresh` to the sealed list, then evict until both bounds hold with
    /// `tail_rows` open rows alongside.
    fn retain(&self, sealed: &SealedChunks, fresh: Vec<Arc<Chunk>>, tail_rows: usize) -> SealedChunks {
        let sealed_rows: usize = sealed.iter().map(|c| c.num_rows()).sum();
        if fresh.is_empty() && sealed_rows + tail_rows <= self.options.max_rows {
            return Arc::clone(sealed);
        }

        let mut next = VecDeque::clone(sealed);
        for chunk in fresh {
            debug!(
                signal = %R::SIGNAL,
                rows = chunk.num_rows(),
                ts_min = chunk.zone().ts_min,
                ts_max = chunk.zone().ts_max,
                "sealed chunk"
            );
            next.push_back(chunk);
        }
        while next.len() > self.options.max_chunks {
            if let Some(evicted) = next.pop_front() {
                debug!(signal = %R::SIGNAL, rows = evicted.num_rows(), "evicted oldest chunk");
            }
        }

        let mut retained = next.iter().map(|c| c.num_rows()).sum::<usize>() + tail_rows;
        while retained > self.options.max_rows {
            let Some(oldest) = next.pop_front() else {
                break;
            };
            let excess = retained - self.options.max_rows;
            if oldest.num_rows() <= excess {
                retained -= oldest.num_rows();
                debug!(signal = %R::SIGNAL, rows = oldest.num_rows(), "evicted oldest chunk");
            } else {
                next.push_front(Arc::new(oldest.skip_oldest(excess)));
                retained -= excess;
                debug!(signal = %R::SIGNAL, rows = excess, "trimmed oldest chunk");
            }
        }
        Arc::new(next)
    }

    /// Every chunk visible now, the open tail materialised last.
    pub fn snapshot(&self) -> Result<Snapshot, BufferError> {
        let (sealed, tail) = {
            let state = self.state.read();
            (Arc::clone(&state.sealed), state.tail.clone())
        };

        let mut chunks: Vec<Arc<Chunk>> = sealed.iter().cloned().collect();
        if let Some(tail) = tail {
            chunks.push(tail.chunk()?);
        }
        Ok(Snapshot::new(R::schema(), ZoneColumns::of::<R>(), chunks))
    }

    /// Snapshot and scan in one call.
    pub fn scan(&self, request: &ScanRequest, options: ScanOptions) -> Result<ScanOutput, ScanError> {
        let snapshot = self.snapshot()?;
        scan(&snapshot, request, options)
    }

    pub fn size(&self) -> usize {
        self.state.read().rows
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Sealed chunks currently retained (the open tail is not counted).
    pub fn chunk_count(&self) -> usize {
        self.state.read().sealed.len()
    }

    pub fn clear(&self) {
        let _writer = self.writer.lock();
        *self.state.write() = Published::empty();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use super::*;
    use arrow::array::TimestampMicrosecondArray;
    use otlpstore_core::{LogRow, ResourceContext};

    fn log_row(ts: i64, service: &str) -> LogRow {
        LogRow {
            resource: Arc::new(ResourceContext {
                service_name: service.to_string(),
                ..Default::default()
            }),
            scope: Default::default(),
            timestamp: ts,
            trace_id: String::new(),
            span_id: String::new(),
            trace_flags: 0,
            severity_text: String::new(),
            severity_number: 0,
            body: format!("row {ts}"),
            attributes: Default::default(),
        }
    }

    fn buffer(chunk_rows: usize, max_chunks: usize) -> ColumnarRingBuffer<LogRow> {
        ColumnarRingBuffer::new(ColumnarOptions {
            chunk_rows,
            max_chunks,
            max_rows: usize::MAX,
        })
    }

    fn timestamps(snapshot: &Snapshot) -> Vec<i64> {
        snapshot
            .batches()
            .flat_map(|batch| {
                batch
                    .column(LogRow::TIMESTAMP_COLUMN)
                    .as_any()
                    .downcast_ref::<TimestampMicrosecondArray>()
                    .unwrap()
                    .values()
                    .to_vec()
            })
            .collect()
    }

    #[test]
    fn for_capacity_rounds_up() {
        let options = ColumnarOptions::for_capacity(10_000, 2048);
        assert_eq!(options.max_chunks, 5);
        assert_eq!(options.max_rows, 10_000);
        assert_eq!(ColumnarOptions::for_capacity(0, 0).max_chunks, 1);

        let small = ColumnarOptions::for_capacity(100, 2048);
        assert_eq!(small.chunk_rows, 100);
        assert_eq!(small.max_chunks, 1);
    }

    #[test]
    fn capacity_is_an_exact_row_bound() {
        let buffer = ColumnarRingBuffer::new(ColumnarOptions::for_capacity(100, 2048));
        for ts in 0..150 {
            buffer.insert(log_row(ts, "svc")).unwrap();
        }
        assert_eq!(buffer.size(), 100);

        let snapshot = buffer.snapshot().unwrap();
        assert_eq!(snapshot.num_rows(), 100);
        assert_eq!(timestamps(&snapshot), (50..150).collect::<Vec<_>>());
    }

    #[test]
    fn trimmed_chunk_keeps_a_covering_zone_map() {
        let buffer = ColumnarRingBuffer::new(ColumnarOptions {
            chunk_rows: 4,
            max_chunks: 8,
            max_rows: 6,
        });
        buffer.insert_batch((0..7).map(|ts| log_row(ts, "svc"))).unwrap();
        assert_eq!(buffer.size(), 6);

        let snapshot = buffer.snapshot().unwrap();
        let oldest = &snapshot.chunks()[0];
        assert_eq!(oldest.num_rows(), 3);
        assert_eq!(oldest.zone().row_count, 3);
        assert!(oldest.zone().ts_min <= 1 && oldest.zone().ts_max >= 3);
        assert_eq!(oldest.zone().service.single_value(), Some("svc"));
        assert_eq!(timestamps(&snapshot), (1..7).collect::<Vec<_>>());
    }

    #[test]
    fn readers_do_not_wait_for_an_insert_in_progress() {
        let buffer = Arc::new(buffer(4, 8));
        buffer.insert(log_row(0, "svc")).unwrap();

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let writer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let rows = (1..6).map(move |ts| {
                    if ts == 2 {
                        entered_tx.send(()).unwrap();
                        release_rx.recv().unwrap();
                    }
                    log_row(ts, "svc")
                });
                buffer.insert_batch(rows).unwrap();
            })
        };

        entered_rx.recv().unwrap();
        assert_eq!(buffer.snapshot().unwrap().num_rows(), 1);
        assert_eq!(buffer.size(), 1);

        release_tx.send(()).unwrap();
        writer.join().unwrap();
        assert_eq!(buffer.size(), 6);
        assert_eq!(buffer.chunk_count(), 1);
    }

    #[test]
    fn empty_insert_publishes_nothing() {
        let buffer = buffer(4, 8);
        buffer.insert_batch(Vec::new()).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.snapshot().unwrap().chunks().len(), 0);
    }

    #[test]
    fn seals_full_chunks_with_zone_maps() {
        let buffer = buffer(4, 8);
        for ts in 0..10 {
            buffer.insert(log_row(ts, if ts < 4 { "a" } else { "b" })).unwrap();
        }
        assert_eq!(buffer.chunk_count(), 2);
        assert_eq!(buffer.size(), 10);

        let snapshot = buffer.snapshot().unwrap();
        assert_eq!(snapshot.chunks().len(), 3);
        assert_eq!(snapshot.num_rows(), 10);

        let first = snapshot.chunks()[0].zone();
        assert_eq!((first.ts_min, first.ts_max), (0, 3));
        assert_eq!(first.service.single_value(), Some("a"));
        assert!(first.metric.is_none());

        let tail = snapshot.chunks()[2].zone();
        assert_eq!(tail.row_count, 2);
        assert_eq!((tail.ts_min, tail.ts_max), (8, 9));
    }

    #[test]
    fn evicts_whole_chunks_oldest_first() {
        let buffer = buffer(2, 2);
        buffer.insert_batch((0..7).map(|ts| log_row(ts, "svc"))).unwrap();
        assert_eq!(buffer.chunk_count(), 2);
        assert_eq!(buffer.size(), 5);

        let snapshot = buffer.snapshot().unwrap();
        let mins: Vec<i64> = snapshot.chunks().iter().map(|c| c.zone().ts_min).collect();
        assert_eq!(mins, vec![2, 4, 6]);
    }

    #[test]
    fn snapshot_is_isolated_from_later_inserts() {
        let buffer = buffer(2, 4);
        buffer.insert_batch((0..3).map(|ts| log_row(ts, "svc"))).unwrap();
        let before = buffer.snapshot().unwrap();
        buffer.insert_batch((3..8).map(|ts| log_row(ts, "svc"))).unwrap();

        assert_eq!(before.num_rows(), 3);
        assert_eq!(buffer.snapshot().unwrap().num_rows(), 8);
    }

    #[test]
    fn open_chunk_is_cached_between_snapshots() {
        let buffer = buffer(8, 4);
        buffer.insert(log_row(1, "svc")).unwrap();
        let a = buffer.snapshot().unwrap();
        let b = buffer.snapshot().unwrap();
        assert!(Arc::ptr_eq(&a.chunks()[0], &b.chunks()[0]));

        buffer.insert(log_row(2, "svc")).unwrap();
        let c = buffer.snapshot().unwrap();
        assert!(!Arc::ptr_eq(&a.chunks()[0], &c.chunks()[0]));
        assert_eq!(c.chunks()[0].num_rows(), 2);
    }

    #[test]
    fn clear_drops_everything() {
        let buffer = buffer(2, 4);
        buffer.insert_batch((0..5).map(|ts| log_row(ts, "svc"))).unwrap();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.snapshot().unwrap().chunks().len(), 0);
    }
}
