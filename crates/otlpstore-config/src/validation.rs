// Configuration validation
//
// Rejects values the scanner and live buffers cannot work with and warns about
// values likely to exhaust memory.

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_scan_config(&config.scan)?;
    validate_buffer_config(&config.buffer)?;
    validate_receiver_config(&config.receiver)?;
    Ok(())
}

fn validate_scan_config(config: &ScanConfig) -> Result<()> {
    if config.max_document_bytes == 0 {
        bail!("scan.max_document_bytes must be greater than 0");
    }

    if config.max_document_bytes > 1024 * 1024 * 1024 {
        // 1 GB
        warn!(
            max_document_bytes = config.max_document_bytes,
            "scan.max_document_bytes is very large; may cause memory issues"
        );
    }

    Ok(())
}

fn validate_buffer_config(config: &BufferConfig) -> Result<()> {
    if config.capacity == 0 {
        bail!("buffer.capacity must be greater than 0");
    }

    if config.chunk_rows == 0 {
        bail!("buffer.chunk_rows must be greater than 0");
    }

    if config.capacity > 10_000_000 {
        warn!(
            capacity = config.capacity,
            "buffer.capacity is very large; may cause memory issues"
        );
    }

    if config.layout == BufferLayout::Columnar && config.chunk_rows > config.capacity {
        warn!(
            chunk_rows = config.chunk_rows,
            capacity = config.capacity,
            "buffer.chunk_rows exceeds buffer.capacity; the columnar buffer keeps one chunk"
        );
    }

    Ok(())
}

fn validate_receiver_config(config: &ReceiverConfig) -> Result<()> {
    if config.queue_depth == 0 {
        bail!("receiver.queue_depth must be greater than 0");
    }

    if config.queue_depth > 100_000 {
        warn!(
            queue_depth = config.queue_depth,
            "receiver.queue_depth is very large; queued payloads are held in memory"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_are_rejected() {
        let mut config = RuntimeConfig::default();
        config.buffer.capacity = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("buffer.capacity"));

        let mut config = RuntimeConfig::default();
        config.buffer.chunk_rows = 0;
        assert!(validate_config(&config).is_err());

        let mut config = RuntimeConfig::default();
        config.receiver.queue_depth = 0;
        assert!(validate_config(&config).is_err());

        let mut config = RuntimeConfig::default();
        config.scan.max_document_bytes = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn large_values_only_warn() {
        let mut config = RuntimeConfig::default();
        config.buffer.capacity = 50_000_000;
        config.scan.max_document_bytes = 4 * 1024 * 1024 * 1024;
        assert!(validate_config(&config).is_ok());
    }
}
