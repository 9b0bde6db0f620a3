// Live attachment
//
// One receiver thread drains a bounded queue of raw payloads, normalizes them outside
// any buffer lock and appends the rows to per-signal tables that query threads scan
// concurrently.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use otlpstore_buffer::{
    scan_rows, BufferError, ColumnarOptions, ColumnarRingBuffer, RingBuffer, ScanError,
    ScanOptions, ScanOutput, ScanRequest,
};
use otlpstore_config::{BufferLayout, RuntimeConfig};
use otlpstore_core::{
    normalize, ErrorKind, LogRow, MetricRow, NormalizeError, PayloadFormat, SignalKind,
    SignalRows, TelemetryRow, TraceRow,
};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Entries kept in the recent-errors ring.
pub const RECENT_ERRORS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveSettings {
    /// Rows retained per signal table.
    pub capacity: usize,
    pub layout: BufferLayout,
    pub chunk_rows: usize,
    /// Payloads queued before [`LiveAttachment::submit`] blocks.
    pub queue_depth: usize,
}

impl Default for LiveSettings {
    fn default() -> Self {
        (&RuntimeConfig::default()).into()
    }
}

impl From<&RuntimeConfig> for LiveSettings {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            capacity: config.buffer.capacity,
            layout: config.buffer.layout,
            chunk_rows: config.buffer.chunk_rows,
            queue_depth: config.receiver.queue_depth,
        }
    }
}

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("live attachment is shut down")]
    Closed,

    #[error("invalid live settings: {0}")]
    InvalidSettings(&'static str),

    #[error("failed to spawn receiver thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("receiver thread panicked")]
    ReceiverPanicked,
}

/// A payload the receiver could not turn into rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    pub signal: SignalKind,
    /// 1-based line of the failing JSON document, when known.
    pub line: Option<usize>,
    /// `None` for buffer failures, which are not normalization errors.
    pub kind: Option<ErrorKind>,
    pub message: String,
}

impl IngestFailure {
    fn normalize(signal: SignalKind, line: Option<usize>, error: &NormalizeError) -> Self {
        Self {
            signal,
            line,
            kind: Some(error.kind()),
            message: error.to_string(),
        }
    }

    fn buffer(signal: SignalKind, error: &BufferError) -> Self {
        Self {
            signal,
            line: None,
            kind: None,
            message: error.to_string(),
        }
    }
}

/// Storage for one signal in the configured layout.
pub enum SignalTable<R: TelemetryRow> {
    Row(RingBuffer<R>),
    Columnar(ColumnarRingBuffer<R>),
}

impl<R: TelemetryRow> SignalTable<R> {
    fn new(settings: &LiveSettings) -> Result<Self, LiveError> {
        let capacity = NonZeroUsize::new(settings.capacity)
            .ok_or(LiveError::InvalidSettings("buffer capacity must be greater than 0"))?;
        if settings.chunk_rows == 0 {
            return Err(LiveError::InvalidSettings(
                "chunk rows must be greater than 0",
            ));
        }
        Ok(match settings.layout {
            BufferLayout::Row => SignalTable::Row(RingBuffer::new(capacity)),
            BufferLayout::Columnar => SignalTable::Columnar(ColumnarRingBuffer::new(
                ColumnarOptions::for_capacity(capacity.get(), settings.chunk_rows),
            )),
        })
    }

    pub fn insert_batch(&self, rows: Vec<R>) -> Result<(), BufferError> {
        match self {
            SignalTable::Row(ring) => {
                ring.insert_batch(rows);
                Ok(())
            }
            SignalTable::Columnar(columnar) => columnar.insert_batch(rows),
        }
    }

    /// Scan a consistent snapshot. The row layout has no zone maps, so `options` only
    /// affects the columnar layout.
    pub fn scan(
        &self,
        request: &ScanRequest,
        options: ScanOptions,
    ) -> Result<ScanOutput, ScanError> {
        match self {
            SignalTable::Row(ring) => scan_rows(&ring.snapshot(), request),
            SignalTable::Columnar(columnar) => columnar.scan(request, options),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            SignalTable::Row(ring) => ring.size(),
            SignalTable::Columnar(columnar) => columnar.size(),
        }
    }

    pub fn clear(&self) {
        match self {
            SignalTable::Row(ring) => ring.clear(),
            SignalTable::Columnar(columnar) => columnar.clear(),
        }
    }
}

/// Per-signal tables shared between the receiver thread and query threads.
pub struct LiveTables {
    pub traces: SignalTable<TraceRow>,
    pub logs: SignalTable<LogRow>,
    pub metrics: SignalTable<MetricRow>,
    errors: RingBuffer<IngestFailure>,
    payloads: AtomicU64,
    rows: AtomicU64,
}

impl LiveTables {
    fn new(settings: &LiveSettings) -> Result<Self, LiveError> {
        let errors_capacity = NonZeroUsize::new(RECENT_ERRORS)
            .ok_or(LiveError::InvalidSettings("recent error capacity is zero"))?;
        Ok(Self {
            traces: SignalTable::new(settings)?,
            logs: SignalTable::new(settings)?,
            metrics: SignalTable::new(settings)?,
            errors: RingBuffer::new(errors_capacity),
            payloads: AtomicU64::new(0),
            rows: AtomicU64::new(0),
        })
    }

    pub fn scan(
        &self,
        signal: SignalKind,
        request: &ScanRequest,
        options: ScanOptions,
    ) -> Result<ScanOutput, ScanError> {
        match signal {
            SignalKind::Traces => self.traces.scan(request, options),
            SignalKind::Logs => self.logs.scan(request, options),
            SignalKind::Metrics => self.metrics.scan(request, options),
        }
    }

    pub fn size(&self, signal: SignalKind) -> usize {
        match signal {
            SignalKind::Traces => self.traces.size(),
            SignalKind::Logs => self.logs.size(),
            SignalKind::Metrics => self.metrics.size(),
        }
    }

    /// Most recent ingest failures, oldest first.
    pub fn recent_errors(&self) -> Vec<IngestFailure> {
        self.errors.snapshot()
    }

    /// Payloads processed by the receiver, failed ones included.
    pub fn payloads_received(&self) -> u64 {
        self.payloads.load(Ordering::Relaxed)
    }

    pub fn rows_ingested(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }

    fn ingest(&self, payload: Payload) {
        self.payloads.fetch_add(1, Ordering::Relaxed);
        let signal = payload.signal;

        let normalized = match normalize(&payload.bytes, signal, payload.hint) {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!(signal = %signal, error = %e, "dropping undecodable payload");
                self.errors.insert(IngestFailure::normalize(signal, None, &e));
                return;
            }
        };

        for doc in normalized.documents {
            match doc.outcome {
                Ok(rows) => self.insert(rows),
                Err(e) => {
                    warn!(signal = %signal, line = ?doc.line, error = %e, "skipping malformed document");
                    self.errors
                        .insert(IngestFailure::normalize(signal, doc.line, &e));
                }
            }
        }
    }

    fn insert(&self, rows: SignalRows) {
        let signal = rows.signal();
        let count = rows.len();
        let result = match rows {
            SignalRows::Traces(rows) => self.traces.insert_batch(rows),
            SignalRows::Logs(rows) => self.logs.insert_batch(rows),
            SignalRows::Metrics(rows) => self.metrics.insert_batch(rows),
        };
        match result {
            Ok(()) => {
                self.rows.fetch_add(count as u64, Ordering::Relaxed);
            }
            Err(e) => {
                warn!(signal = %signal, rows = count, error = %e, "failed to buffer rows");
                self.errors.insert(IngestFailure::buffer(signal, &e));
            }
        }
    }
}

#[derive(Debug)]
struct Payload {
    signal: SignalKind,
    bytes: Vec<u8>,
    hint: Option<PayloadFormat>,
}

/// Live ingest: a bounded queue, one receiver thread and the tables it fills.
///
/// Dropping the attachment performs the same orderly shutdown as
/// [`LiveAttachment::shutdown`].
pub struct LiveAttachment {
    sender: Mutex<Option<SyncSender<Payload>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    tables: Arc<LiveTables>,
}

impl LiveAttachment {
    pub fn start(settings: LiveSettings) -> Result<Self, LiveError> {
        if settings.queue_depth == 0 {
            return Err(LiveError::InvalidSettings(
                "queue depth must be greater than 0",
            ));
        }
        let tables = Arc::new(LiveTables::new(&settings)?);
        let (sender, receiver) = mpsc::sync_channel(settings.queue_depth);

        let worker_tables = Arc::clone(&tables);
        let worker = thread::Builder::new()
            .name("otlpstore-receiver".to_string())
            .spawn(move || run_receiver(receiver, worker_tables))
            .map_err(LiveError::Spawn)?;

        info!(
            capacity = settings.capacity,
            layout = %settings.layout,
            queue_depth = settings.queue_depth,
            "live attachment started"
        );
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            tables,
        })
    }

    /// Queue a payload, blocking while the queue is full. The format is detected.
    pub fn submit(&self, signal: SignalKind, payload: impl Into<Vec<u8>>) -> Result<(), LiveError> {
        self.submit_with_hint(signal, payload, None)
    }

    pub fn submit_with_hint(
        &self,
        signal: SignalKind,
        payload: impl Into<Vec<u8>>,
        hint: Option<PayloadFormat>,
    ) -> Result<(), LiveError> {
        // Clone outside the send so a full queue never blocks shutdown on this lock.
        let sender = self.sender.lock().clone().ok_or(LiveError::Closed)?;
        sender
            .send(Payload {
                signal,
                bytes: payload.into(),
                hint,
            })
            .map_err(|_| LiveError::Closed)
    }

    pub fn tables(&self) -> Arc<LiveTables> {
        Arc::clone(&self.tables)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Close the queue, let the receiver drain what was already queued, then join it.
    ///
    /// Buffered rows stay readable through handles from [`LiveAttachment::tables`].
    /// Calling this more than once is a no-op.
    pub fn shutdown(&self) -> Result<(), LiveError> {
        drop(self.sender.lock().take());
        let Some(worker) = self.worker.lock().take() else {
            return Ok(());
        };
        worker.join().map_err(|_| LiveError::ReceiverPanicked)?;
        info!(
            payloads = self.tables.payloads_received(),
            rows = self.tables.rows_ingested(),
            "live attachment stopped"
        );
        Ok(())
    }
}

impl Drop for LiveAttachment {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "live attachment shutdown failed");
        }
    }
}

fn run_receiver(receiver: Receiver<Payload>, tables: Arc<LiveTables>) {
    // Ends once every sender is dropped and the queue is empty.
    for payload in receiver {
        tables.ingest(payload);
    }
    debug!("receiver queue drained");
}
