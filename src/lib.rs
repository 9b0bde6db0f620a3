// otlpstore - file scans and live buffers over normalized OTLP telemetry
//
// Ties the workspace together: the file-scan collaborator (size ceiling, on-error
// policy, scan stats), the live attachment (receiver thread feeding bounded buffers)
// and tracing initialisation for the `otlpstore` binary.

pub mod file_scan;
mod init;
pub mod live;

pub use file_scan::{
    format_hint, read_limited, DocumentFailure, FileScan, FileScanner, ScanFileError,
    ScanSettings, ScanStats,
};
pub use init::init_tracing;
pub use live::{
    IngestFailure, LiveAttachment, LiveError, LiveSettings, LiveTables, SignalTable,
    RECENT_ERRORS,
};
