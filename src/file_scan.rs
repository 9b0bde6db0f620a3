// File-scan collaborator
//
// Reads whole OTLP files, enforces the size ceiling before parsing and applies the
// on-error policy to the per-document results of normalization.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use otlpstore_config::{OnError, ScanConfig, DEFAULT_MAX_DOCUMENT_BYTES};
use otlpstore_core::{
    normalize_rows, ErrorKind, LogRow, MetricRow, NormalizeError, PayloadFormat, SignalKind,
    SignalRows, TelemetryRow, TraceRow,
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub on_error: OnError,
    /// Largest file or payload accepted, in bytes.
    pub max_document_bytes: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            on_error: OnError::Fail,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

impl From<&ScanConfig> for ScanSettings {
    fn from(config: &ScanConfig) -> Self {
        Self {
            on_error: config.on_error,
            max_document_bytes: config.max_document_bytes,
        }
    }
}

/// Counters for one scan, or the running total of a scanner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files: usize,
    pub documents: usize,
    pub error_documents: usize,
    pub rows: usize,
}

impl std::ops::AddAssign for ScanStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.documents += other.documents;
        self.error_documents += other.error_documents;
        self.rows += other.rows;
    }
}

/// A document dropped under [`OnError::Skip`].
#[derive(Debug)]
pub struct DocumentFailure {
    pub source: String,
    /// 1-based line of the JSON document; `None` for protobuf or an undetectable payload.
    pub line: Option<usize>,
    pub error: NormalizeError,
}

#[derive(Debug, Error)]
pub enum ScanFileError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("input '{input}' ({size} bytes) exceeds maximum supported size of {limit} bytes")]
    TooLarge {
        input: String,
        size: u64,
        limit: usize,
    },

    #[error("{input}: {error}")]
    Document {
        input: String,
        line: Option<usize>,
        #[source]
        error: NormalizeError,
    },
}

impl ScanFileError {
    /// Error class for normalization and size failures; `None` for I/O.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ScanFileError::Io { .. } => None,
            ScanFileError::TooLarge { .. } => Some(ErrorKind::Capacity),
            ScanFileError::Document { error, .. } => Some(error.kind()),
        }
    }
}

/// Rows of one file with the bookkeeping of how they were obtained.
#[derive(Debug)]
pub struct FileScan<B> {
    pub rows: B,
    pub stats: ScanStats,
    pub failures: Vec<DocumentFailure>,
}

impl<B> FileScan<B> {
    pub fn map<C>(self, f: impl FnOnce(B) -> C) -> FileScan<C> {
        FileScan {
            rows: f(self.rows),
            stats: self.stats,
            failures: self.failures,
        }
    }
}

/// Scans files and byte payloads, keeping a running [`ScanStats`] total across calls.
#[derive(Debug, Default)]
pub struct FileScanner {
    settings: ScanSettings,
    totals: ScanStats,
}

impl FileScanner {
    pub fn new(settings: ScanSettings) -> Self {
        Self {
            settings,
            totals: ScanStats::default(),
        }
    }

    pub fn settings(&self) -> ScanSettings {
        self.settings
    }

    /// Totals over every scan so far, failed scans included.
    pub fn totals(&self) -> ScanStats {
        self.totals
    }

    pub fn reset_totals(&mut self) {
        self.totals = ScanStats::default();
    }

    /// Read and normalize one file. The extension, when recognised, is the format hint.
    pub fn scan_path(
        &mut self,
        path: impl AsRef<Path>,
        signal: SignalKind,
    ) -> Result<FileScan<SignalRows>, ScanFileError> {
        let path = path.as_ref();
        let bytes = read_limited(path, self.settings.max_document_bytes)?;
        let hint = format_hint(path);
        self.scan_bytes(&path.display().to_string(), &bytes, signal, hint)
    }

    /// Normalize an in-memory payload; `source` names it in errors.
    pub fn scan_bytes(
        &mut self,
        source: &str,
        bytes: &[u8],
        signal: SignalKind,
        hint: Option<PayloadFormat>,
    ) -> Result<FileScan<SignalRows>, ScanFileError> {
        match signal {
            SignalKind::Traces => self
                .scan_typed::<TraceRow>(source, bytes, hint)
                .map(|scan| scan.map(SignalRows::Traces)),
            SignalKind::Logs => self
                .scan_typed::<LogRow>(source, bytes, hint)
                .map(|scan| scan.map(SignalRows::Logs)),
            SignalKind::Metrics => self
                .scan_typed::<MetricRow>(source, bytes, hint)
                .map(|scan| scan.map(SignalRows::Metrics)),
        }
    }

    /// Typed variant of [`FileScanner::scan_bytes`].
    pub fn scan_typed<R: TelemetryRow>(
        &mut self,
        source: &str,
        bytes: &[u8],
        hint: Option<PayloadFormat>,
    ) -> Result<FileScan<Vec<R>>, ScanFileError> {
        ensure_within(source, bytes.len() as u64, self.settings.max_document_bytes)?;

        let mut stats = ScanStats {
            files: 1,
            ..ScanStats::default()
        };
        let result = self.collect::<R>(source, bytes, hint, &mut stats);
        self.totals += stats;

        let (rows, failures) = result?;
        debug!(
            source,
            signal = %R::SIGNAL,
            documents = stats.documents,
            error_documents = stats.error_documents,
            rows = stats.rows,
            "scanned input"
        );
        Ok(FileScan {
            rows,
            stats,
            failures,
        })
    }

    fn collect<R: TelemetryRow>(
        &self,
        source: &str,
        bytes: &[u8],
        hint: Option<PayloadFormat>,
        stats: &mut ScanStats,
    ) -> Result<(Vec<R>, Vec<DocumentFailure>), ScanFileError> {
        let mut rows = Vec::new();
        let mut failures = Vec::new();

        let normalized = match normalize_rows::<R>(bytes, hint) {
            Ok(normalized) => normalized,
            Err(error) => {
                stats.documents += 1;
                self.handle_failure(source, None, error, stats, &mut failures)?;
                return Ok((rows, failures));
            }
        };

        for doc in normalized.documents {
            stats.documents += 1;
            match doc.outcome {
                Ok(doc_rows) => {
                    stats.rows += doc_rows.len();
                    rows.extend(doc_rows);
                }
                Err(error) => self.handle_failure(source, doc.line, error, stats, &mut failures)?,
            }
        }
        Ok((rows, failures))
    }

    fn handle_failure(
        &self,
        source: &str,
        line: Option<usize>,
        error: NormalizeError,
        stats: &mut ScanStats,
        failures: &mut Vec<DocumentFailure>,
    ) -> Result<(), ScanFileError> {
        stats.error_documents += 1;
        match self.settings.on_error {
            OnError::Fail => Err(ScanFileError::Document {
                input: source.to_string(),
                line,
                error,
            }),
            OnError::Skip => {
                warn!(source, line = ?line, error = %error, "skipping malformed document");
                failures.push(DocumentFailure {
                    source: source.to_string(),
                    line,
                    error,
                });
                Ok(())
            }
        }
    }
}

/// Read a whole file, refusing it before reading when it is larger than `limit` bytes.
pub fn read_limited(path: &Path, limit: usize) -> Result<Vec<u8>, ScanFileError> {
    let io_error = |source| ScanFileError::Io {
        path: path.to_path_buf(),
        source,
    };
    let size = fs::metadata(path).map_err(io_error)?.len();
    ensure_within(&path.display().to_string(), size, limit)?;
    fs::read(path).map_err(io_error)
}

fn ensure_within(source: &str, size: u64, limit: usize) -> Result<(), ScanFileError> {
    if size > limit as u64 {
        return Err(ScanFileError::TooLarge {
            input: source.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

/// Format hint derived from a file extension (`.json`, `.jsonl`, `.pb`, ...).
pub fn format_hint(path: &Path) -> Option<PayloadFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(PayloadFormat::from_extension)
}
