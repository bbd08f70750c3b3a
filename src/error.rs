use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error type returned by ingestion and configuration loading.
///
/// This is a single error enum shared across CSV and JSON sources.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error (config files).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not conform to the provided schema (missing required fields/columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Error type returned by query entry points.
///
/// Data-quality issues (missing metrics, duplicate rows, empty windows) never show up here; they
/// are absorbed by the reduction policies in [`crate::processing`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A request date did not match the expected format.
    #[error("malformed date '{raw}' (expected {expected})")]
    MalformedDate { raw: String, expected: &'static str },

    /// The region filter matched no rows in a query that needs at least one.
    #[error("unknown region '{region}'")]
    UnknownRegion { region: String },

    /// A configured column is not present in the table.
    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    /// A column exists but holds a different logical type.
    #[error("column '{column}' has the wrong type (expected {expected})")]
    TypeMismatch {
        column: String,
        expected: &'static str,
    },
}
