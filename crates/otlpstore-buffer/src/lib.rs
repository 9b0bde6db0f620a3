// otlpstore-buffer - bounded telemetry stores
//
// A row-oriented ring buffer and a columnar ring buffer of zone-mapped Arrow
// chunks, plus the scan engine that prunes chunks before touching rows. Both
// buffers assume one writer and any number of concurrent readers.

pub mod columnar;
pub mod error;
pub mod ring;
pub mod scan;
pub mod zone;

pub use columnar::{Chunk, ColumnarOptions, ColumnarRingBuffer, Snapshot};
pub use error::{BufferError, ScanError};
pub use ring::RingBuffer;
pub use scan::{
    scan, scan_rows, Predicate, ScanMetrics, ScanOptions, ScanOutput, ScanRequest, Verdict,
};
pub use zone::{ValueMarker, ZoneColumns, ZoneMap};
