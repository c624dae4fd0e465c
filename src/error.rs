//! Errors raised by the pipeline stages.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: `{}`. {hint}", path.display())]
    MissingInput { path: PathBuf, hint: String },

    #[error("row {row}: cannot parse timestamp `{value}` (expected `YYYY/MM/DD HHMM`)")]
    Timestamp { row: usize, value: String },

    #[error("row {row}: column `{column}` has non-numeric value `{value}`")]
    Number {
        row: usize,
        column: String,
        value: String,
    },

    #[error("required column `{0}` not found")]
    MissingColumn(String),

    #[error("malformed station export: {0}")]
    MalformedExport(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("failed to render chart: {0}")]
    Plot(String),
}
