//! Error taxonomy for the import pipeline.
//!
//! Only batch-level failures are represented here. Per-row skips and per-cell
//! coercion degradation are never raised; they are counted in
//! [`crate::validate::ValidationReport`] instead.

use thiserror::Error;

pub type ImportResult<T> = std::result::Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Input file contains no usable header row")]
    EmptyInput,
    #[error("Unsupported file type '{content_type}': only delimited text (CSV) can be imported")]
    UnsupportedContentType { content_type: String },
    #[error("Failed to decode input with encoding {encoding}")]
    Decode { encoding: String },
    #[error("Malformed delimited text: {0}")]
    Csv(#[from] csv::Error),
    #[error("No project selected: a project id is required before rows can be imported")]
    MissingProjectContext,
    #[error("No catalog table matches the file headers; choose a destination table manually")]
    NoTableMatched,
    #[error("Unknown destination table '{name}'")]
    UnknownTable { name: String },
    #[error("Invalid schema catalog: {0}")]
    Catalog(String),
    #[error("Bulk insert into '{table}' failed: {message}")]
    BackendWrite { table: String, message: String },
}

impl ImportError {
    /// True for failures that happen before any row is processed.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, ImportError::BackendWrite { .. })
    }
}
