//! # colcalc-formula
//!
//! Formula language for colcalc computed columns.
//!
//! This crate provides:
//! - Tokenizing and parsing (`=` text → tokens → AST)
//! - Evaluation against a per-record [`Environment`]
//! - Built-in functions, including typed casts for currency and dates
//! - Template mode for text without a leading `=`
//! - Storage formatting and result type inference
//! - Static diagnostics for formulas being saved
//!
//! ## Example
//!
//! ```rust
//! use colcalc_formula::{evaluate, format_for_storage, Environment};
//!
//! let env = Environment::new().with("First", "Ada").with("Last", "Lovelace");
//! let value = evaluate("=UPPER({First}) \" \" {Last}", &env);
//! assert_eq!(format_for_storage(&value).text, "ADA Lovelace");
//! ```

pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod functions;
pub mod parser;
pub mod template;
pub mod tokenizer;
pub mod value;

pub use ast::{BinaryOperator, ColumnRef, Expr, UnaryOperator};
pub use diagnostics::{check_formula, referenced_columns, Diagnostic};
pub use environment::{coerce_stored_value, Environment};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{
    error_marker, evaluate, evaluate_node, is_error_marker, try_evaluate, ERROR_PREFIX,
};
pub use format::{format_for_storage, infer_type, StoredValue};
pub use functions::{Arity, Category, Function};
pub use parser::{parse, parse_formula, MAX_NESTING_DEPTH};
pub use template::evaluate_template;
pub use tokenizer::{tokenize, Token};
pub use value::{FormulaValue, Number, TypedKind, TypedResult};
