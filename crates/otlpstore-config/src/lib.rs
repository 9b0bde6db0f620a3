// otlpstore-config - Runtime configuration for scans and live buffers
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority, OTLPSTORE_* prefix)
// 2. Config file path from OTLPSTORE_CONFIG env var
// 3. Config file contents from OTLPSTORE_CONFIG_CONTENT env var
// 4. Default config file location (./otlpstore.toml)
// 5. Built-in defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};
pub use sources::{load_config, load_from_file_path, load_from_str};

/// Default file-scan size ceiling (100 MB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 100 * 1024 * 1024;

/// Main runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub receiver: ReceiverConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// File-scan configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub on_error: OnError,
    pub max_document_bytes: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            on_error: OnError::Fail,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

/// What a file scan does with a document that fails to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Abort the scan at the first failing document.
    Fail,
    /// Drop the failing document, record the error and keep going.
    Skip,
}

impl std::fmt::Display for OnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnError::Fail => write!(f, "fail"),
            OnError::Skip => write!(f, "skip"),
        }
    }
}

impl std::str::FromStr for OnError {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fail" | "error" => Ok(OnError::Fail),
            "skip" | "ignore" => Ok(OnError::Skip),
            _ => anyhow::bail!("Unsupported on_error policy: {}. Supported: fail, skip", s),
        }
    }
}

/// Live buffer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Rows retained per signal table.
    pub capacity: usize,
    pub layout: BufferLayout,
    /// Rows per sealed chunk in the columnar layout.
    pub chunk_rows: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            layout: BufferLayout::Columnar,
            chunk_rows: 2048,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferLayout {
    /// Fixed-capacity ring of typed rows.
    Row,
    /// Ring of sealed Arrow chunks with zone maps.
    Columnar,
}

impl std::fmt::Display for BufferLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferLayout::Row => write!(f, "row"),
            BufferLayout::Columnar => write!(f, "columnar"),
        }
    }
}

impl std::str::FromStr for BufferLayout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "row" | "rows" => Ok(BufferLayout::Row),
            "columnar" | "column" | "arrow" => Ok(BufferLayout::Columnar),
            _ => anyhow::bail!("Unsupported buffer layout: {}. Supported: row, columnar", s),
        }
    }
}

/// Live receiver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Payloads queued for the receiver thread before `submit` blocks.
    pub queue_depth: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self { queue_depth: 64 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `otlpstore_buffer=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_from_str() {
        assert_eq!("skip".parse::<OnError>().unwrap(), OnError::Skip);
        assert_eq!("FAIL".parse::<OnError>().unwrap(), OnError::Fail);
        assert_eq!("row".parse::<BufferLayout>().unwrap(), BufferLayout::Row);
        assert_eq!(
            "arrow".parse::<BufferLayout>().unwrap(),
            BufferLayout::Columnar
        );
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("nullify".parse::<OnError>().is_err());
    }

    #[test]
    fn test_default_configs() {
        let config = RuntimeConfig::default();
        assert_eq!(config.scan.on_error, OnError::Fail);
        assert_eq!(config.scan.max_document_bytes, 104_857_600);
        assert_eq!(config.buffer.capacity, 10_000);
        assert_eq!(config.buffer.layout, BufferLayout::Columnar);
        assert_eq!(config.buffer.chunk_rows, 2048);
        assert_eq!(config.receiver.queue_depth, 64);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RuntimeConfig = toml::from_str(
            r#"
            [buffer]
            layout = "row"

            [scan]
            on_error = "skip"
            "#,
        )
        .unwrap();
        assert_eq!(config.buffer.layout, BufferLayout::Row);
        assert_eq!(config.buffer.capacity, 10_000);
        assert_eq!(config.scan.on_error, OnError::Skip);
        assert_eq!(config.scan.max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
        assert_eq!(config.receiver, ReceiverConfig::default());
    }
}
