//! # colcalc
//!
//! Computed columns for user-defined tables.
//!
//! A computed column holds either a formula (`={Price} * {Qty}`) or a text
//! template (`{First} {Last}`) that is evaluated against the other columns of
//! each record.
//!
//! ## Features
//!
//! - Formula language with arithmetic, comparison and implicit concatenation
//! - Built-in text, logical, numeric and cast functions
//! - Typed results (currency, date, time, datetime) that set the column's
//!   display type
//! - Per-record and per-table recomputation with error markers
//! - Stored-value validation with time-bounded pattern checks
//!
//! ## Example
//!
//! ```rust
//! use colcalc::prelude::*;
//!
//! let mut table = Table::new("People");
//! table.add_column(Column::new("First", ColumnType::Text));
//! table.add_column(Column::new("Last", ColumnType::Text));
//! table.add_column(Column::computed("Greeting", "=\"Hello, \" {First} \" \" {Last}"));
//!
//! let mut record = table.new_record();
//! record.set(0, "Ada").unwrap();
//! record.set(1, "Lovelace").unwrap();
//!
//! table.recompute_record(&mut record).unwrap();
//! assert_eq!(record.get(2), Some("Hello, Ada Lovelace"));
//! ```

pub mod calculation;
pub mod prelude;

// Re-export calculation types
pub use calculation::{RecomputeOptions, RecomputeStats, TableCalculationExt};

// Re-export core types
pub use colcalc_core::{
    validate_format,
    validate_type,
    // Schema types
    Column,
    ColumnType,
    // Error types
    Error,
    Record,
    Result,
    Table,
    // Validation types
    ValidationOptions,
    ValidationOutcome,
    ValueFormat,
};

// Re-export formula types
pub use colcalc_formula::{
    check_formula, evaluate, evaluate_template, format_for_storage, infer_type, is_error_marker,
    parse_formula, referenced_columns, try_evaluate, Diagnostic, Environment, Expr, FormulaError,
    FormulaResult, FormulaValue, Function, StoredValue, TypedKind, TypedResult,
};
