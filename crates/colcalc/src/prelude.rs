//! Prelude module - common imports for colcalc users
//!
//! ```rust
//! use colcalc::prelude::*;
//! ```

pub use crate::{
    // Schema types
    Column,
    ColumnType,
    // Formula types
    Environment,
    // Error types
    Error,
    FormulaError,
    FormulaValue,
    Record,
    // Calculation types
    RecomputeOptions,
    RecomputeStats,
    Result,
    Table,
    // Extension traits
    TableCalculationExt,
    ValueFormat,
};
