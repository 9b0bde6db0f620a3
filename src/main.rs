use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use arrow::util::pretty::pretty_format_batches;
use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use otlpstore::{
    format_hint, init_tracing, read_limited, FileScanner, LiveAttachment, LiveSettings,
    ScanSettings,
};
use otlpstore_buffer::{ScanOptions, ScanOutput, ScanRequest};
use otlpstore_config::{BufferLayout, OnError, RuntimeConfig};
use otlpstore_core::otlp::common::field_names::arrow as column;
use otlpstore_core::SignalKind;
use tracing::info;

/// Normalize OTLP files and query them through bounded live buffers
#[derive(Parser)]
#[command(name = "otlpstore")]
#[command(version)]
#[command(about = "Normalize OTLP files and query them through bounded live buffers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize files and report per-file and total scan statistics
    Scan {
        /// Signal the files contain: traces, logs or metrics
        #[arg(short, long)]
        signal: SignalKind,

        /// What to do with a document that fails to parse: fail or skip
        #[arg(long, value_name = "POLICY")]
        on_error: Option<OnError>,

        /// Largest file accepted, in bytes
        #[arg(long, value_name = "BYTES")]
        max_document_bytes: Option<usize>,

        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Feed files through a live attachment, then run a pruned scan over the buffers
    Replay {
        #[arg(short, long)]
        signal: SignalKind,

        /// Keep rows whose service name equals NAME
        #[arg(long, value_name = "NAME")]
        service: Option<String>,

        /// Keep metric rows whose metric name equals NAME
        #[arg(long, value_name = "NAME")]
        metric: Option<String>,

        /// Keep rows at or after this RFC 3339 instant
        #[arg(long, value_parser = parse_rfc3339)]
        since: Option<DateTime<FixedOffset>>,

        /// Keep rows at or before this RFC 3339 instant
        #[arg(long, value_parser = parse_rfc3339)]
        until: Option<DateTime<FixedOffset>>,

        /// Buffer layout: row or columnar
        #[arg(long)]
        layout: Option<BufferLayout>,

        /// Evaluate every row instead of pruning chunks with zone maps
        #[arg(long)]
        no_prune: bool,

        /// Rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,

        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => otlpstore_config::load_from_file_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RuntimeConfig::load().context("Failed to load configuration")?,
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    match cli.command {
        Commands::Scan {
            signal,
            on_error,
            max_document_bytes,
            files,
        } => {
            if let Some(on_error) = on_error {
                config.scan.on_error = on_error;
            }
            if let Some(max) = max_document_bytes {
                config.scan.max_document_bytes = max;
            }
            config.validate()?;
            init_tracing(&config.logging);
            run_scan(&config, signal, &files)
        }
        Commands::Replay {
            signal,
            service,
            metric,
            since,
            until,
            layout,
            no_prune,
            limit,
            files,
        } => {
            if let Some(layout) = layout {
                config.buffer.layout = layout;
            }
            config.validate()?;
            init_tracing(&config.logging);

            let mut request = ScanRequest::new();
            if let Some(service) = service {
                request = request.equals(column::SERVICE_NAME, service);
            }
            if let Some(metric) = metric {
                if signal != SignalKind::Metrics {
                    bail!("--metric only applies to --signal metrics");
                }
                request = request.equals(column::METRIC_NAME, metric);
            }
            if since.is_some() || until.is_some() {
                let min = since.map(|t| native_timestamp(signal, &t)).transpose()?;
                let max = until.map(|t| native_timestamp(signal, &t)).transpose()?;
                request = request.timestamp_range(min, max);
            }
            let options = ScanOptions { prune: !no_prune };
            run_replay(&config, signal, &files, &request, options, limit)
        }
    }
}

fn run_scan(config: &RuntimeConfig, signal: SignalKind, files: &[PathBuf]) -> Result<()> {
    let mut scanner = FileScanner::new(ScanSettings::from(&config.scan));

    for path in files {
        let scan = scanner
            .scan_path(path, signal)
            .with_context(|| format!("Failed to scan {}", path.display()))?;
        println!(
            "{}: documents={} error_documents={} rows={}",
            path.display(),
            scan.stats.documents,
            scan.stats.error_documents,
            scan.stats.rows
        );
        for failure in &scan.failures {
            match failure.line {
                Some(line) => println!("  skipped line {line}: {}", failure.error),
                None => println!("  skipped payload: {}", failure.error),
            }
        }
    }

    let totals = scanner.totals();
    println!(
        "total: files={} documents={} error_documents={} rows={}",
        totals.files, totals.documents, totals.error_documents, totals.rows
    );
    Ok(())
}

fn run_replay(
    config: &RuntimeConfig,
    signal: SignalKind,
    files: &[PathBuf],
    request: &ScanRequest,
    options: ScanOptions,
    limit: usize,
) -> Result<()> {
    let live = LiveAttachment::start(LiveSettings::from(config))?;

    for path in files {
        let bytes = read_limited(path, config.scan.max_document_bytes)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        live.submit_with_hint(signal, bytes, format_hint(path))?;
    }

    let tables = live.tables();
    live.shutdown()?;
    info!(
        payloads = tables.payloads_received(),
        rows = tables.rows_ingested(),
        buffered = tables.size(signal),
        "replay ingested"
    );
    for failure in tables.recent_errors() {
        eprintln!("ingest error: {}", failure.message);
    }

    let output = tables.scan(signal, request, options)?;
    print_output(&output, limit)
}

fn print_output(output: &ScanOutput, limit: usize) -> Result<()> {
    let mut remaining = limit;
    let mut shown = Vec::new();
    for batch in &output.batches {
        if remaining == 0 {
            break;
        }
        let take = batch.num_rows().min(remaining);
        if take > 0 {
            shown.push(batch.slice(0, take));
            remaining -= take;
        }
    }
    if !shown.is_empty() {
        println!("{}", pretty_format_batches(&shown)?);
    }

    let m = output.metrics;
    println!(
        "matched {} rows (showing {}); chunks: total={} skipped={} passthrough={} filtered={}; rows examined={}",
        m.rows_emitted,
        limit.min(m.rows_emitted),
        m.chunks_total,
        m.chunks_skipped,
        m.chunks_passthrough,
        m.chunks_filtered,
        m.rows_examined
    );
    Ok(())
}

/// Timestamp in the unit the signal's schema stores: nanoseconds for traces,
/// microseconds for logs and metrics.
fn native_timestamp(signal: SignalKind, at: &DateTime<FixedOffset>) -> Result<i64> {
    match signal {
        SignalKind::Traces => at
            .timestamp_nanos_opt()
            .with_context(|| format!("{at} is out of range for nanosecond timestamps")),
        SignalKind::Logs | SignalKind::Metrics => Ok(at.timestamp_micros()),
    }
}

fn parse_rfc3339(value: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(value).map_err(|e| format!("invalid RFC 3339 timestamp: {e}"))
}
