use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use thiserror::Error;

/// Failure assembling chunk batches; only happens when rows and schema disagree.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("failed to assemble chunk batch: {0}")]
    Arrow(#[from] ArrowError),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("projection index {index} out of range for {columns} columns")]
    ProjectionOutOfRange { index: usize, columns: usize },

    #[error("equality predicate on `{column}` requires a string column, found {data_type}")]
    NotAString { column: String, data_type: DataType },

    #[error("timestamp column `{column}` has unsupported type {data_type}")]
    NotATimestamp { column: String, data_type: DataType },

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("scan kernel failed: {0}")]
    Arrow(#[from] ArrowError),
}
