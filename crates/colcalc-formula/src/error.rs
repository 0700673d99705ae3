//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula tokenizing, parsing or evaluation
///
/// The `Display` form of every variant is the bare message that follows
/// `#ERROR: ` in an error marker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Tokenizer or parser could not produce an expression
    #[error("{0}")]
    Syntax(String),

    /// Divisor coerced to zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Date/time component could not be parsed or is not a real calendar value
    #[error("Invalid {kind}: {message}")]
    InvalidTemporal { kind: &'static str, message: String },
}

impl FormulaError {
    /// Create a syntax error with a message
    pub fn syntax<S: Into<String>>(msg: S) -> Self {
        FormulaError::Syntax(msg.into())
    }

    /// Check if this error was raised before evaluation started
    pub fn is_syntax(&self) -> bool {
        matches!(self, FormulaError::Syntax(_))
    }
}
