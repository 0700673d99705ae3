//! Error types for colcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in colcalc-core
#[derive(Debug, Error)]
pub enum Error {
    /// Column type name not recognised
    #[error("Unknown column type: {0}")]
    UnknownColumnType(String),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (count: {1})")]
    ColumnOutOfBounds(usize, usize),

    /// Column not found by name
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Record width does not match the table schema
    #[error("Record has {actual} values, table has {expected} columns")]
    RecordWidth { expected: usize, actual: usize },

    /// Stored value rejected by the column's format check
    #[error("Invalid value for column {column}: {message}")]
    InvalidValue { column: String, message: String },

    /// Formula could not be evaluated
    #[error("Formula error: {0}")]
    Formula(String),
}
