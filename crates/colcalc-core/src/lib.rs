//! # colcalc-core
//!
//! Core data structures for the colcalc computed-column engine.
//!
//! This crate provides the schema-side types the formula engine works against:
//! - [`ColumnType`] and [`Column`] - Declared column types and column definitions
//! - [`Table`] - An ordered list of columns, possibly with duplicate names
//! - [`Record`] - Stored string values of one row
//! - [`validate_format`] / [`validate_type`] - Stored-value checks, including
//!   time-bounded checks against user-supplied patterns
//!
//! ## Example
//!
//! ```rust
//! use colcalc_core::{Column, ColumnType, Table};
//!
//! let mut table = Table::new("People");
//! table.add_column(Column::new("First", ColumnType::Text));
//! table.add_column(Column::new("Last", ColumnType::Text));
//! table.add_column(Column::computed("Full Name", "{First} {Last}"));
//!
//! let mut record = table.new_record();
//! record.set(0, "Ada").unwrap();
//! record.set(1, "Lovelace").unwrap();
//! assert_eq!(table.computed_columns().count(), 1);
//! ```

pub mod column;
pub mod error;
pub mod record;
pub mod table;
pub mod validation;

// Re-exports for convenience
pub use column::{Column, ColumnType};
pub use error::{Error, Result};
pub use record::Record;
pub use table::Table;
pub use validation::{
    validate_format, validate_type, ValidationOptions, ValidationOutcome, ValueFormat,
};
