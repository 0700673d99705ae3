//! Static checks for formulas
//!
//! Used when a computed column is saved, before any record is evaluated.

use std::fmt;

use crate::ast::{ColumnRef, Expr};
use crate::error::FormulaError;
use crate::functions::Function;
use crate::parser::parse_formula;
use crate::template::template_references;

/// A problem found in a formula without evaluating it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Formula does not tokenize or parse
    Syntax(String),
    /// Call to a function that does not exist
    UnknownFunction(String),
    /// Call with an argument count the function never accepts
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },
    /// Reference to a column that is not in the table
    UnknownColumn(ColumnRef),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Syntax(message) => write!(f, "Syntax error: {}", message),
            Diagnostic::UnknownFunction(name) => write!(f, "Unknown function: {}", name),
            Diagnostic::ArgumentCount {
                function,
                expected,
                actual,
            } => write!(
                f,
                "Wrong number of arguments for {}: expected {}, got {}",
                function, expected, actual
            ),
            Diagnostic::UnknownColumn(reference) => write!(f, "Unknown column: {}", reference),
        }
    }
}

/// Column references in an expression, in order of first appearance
pub fn referenced_columns(expr: &Expr) -> Vec<ColumnRef> {
    let mut refs = Vec::new();
    collect_references(expr, &mut refs);
    refs
}

fn collect_references(expr: &Expr, refs: &mut Vec<ColumnRef>) {
    match expr {
        Expr::ColumnRef(r) => {
            if !refs.contains(r) {
                refs.push(r.clone());
            }
        }
        Expr::BinaryOp { left, right, .. } => {
            collect_references(left, refs);
            collect_references(right, refs);
        }
        Expr::UnaryOp { operand, .. } => collect_references(operand, refs),
        Expr::Function { args, .. } => {
            for arg in args {
                collect_references(arg, refs);
            }
        }
        Expr::Number(_) | Expr::String(_) | Expr::Boolean(_) => {}
    }
}

fn check_calls(expr: &Expr, diagnostics: &mut Vec<Diagnostic>) {
    match expr {
        Expr::Function { name, args } => {
            match Function::lookup(name).and_then(|f| f.check_arity(args.len())) {
                Ok(()) => {}
                Err(FormulaError::UnknownFunction(name)) => {
                    diagnostics.push(Diagnostic::UnknownFunction(name))
                }
                Err(FormulaError::ArgumentCount {
                    function,
                    expected,
                    actual,
                }) => diagnostics.push(Diagnostic::ArgumentCount {
                    function,
                    expected,
                    actual,
                }),
                Err(other) => diagnostics.push(Diagnostic::Syntax(other.to_string())),
            }
            for arg in args {
                check_calls(arg, diagnostics);
            }
        }
        Expr::BinaryOp { left, right, .. } => {
            check_calls(left, diagnostics);
            check_calls(right, diagnostics);
        }
        Expr::UnaryOp { operand, .. } => check_calls(operand, diagnostics),
        Expr::ColumnRef(_) | Expr::Number(_) | Expr::String(_) | Expr::Boolean(_) => {}
    }
}

/// A reference resolves when a column has that name and, if indexed, at
/// least `index + 1` columns share it
fn is_known<S: AsRef<str>>(reference: &ColumnRef, known_columns: &[S]) -> bool {
    let occurrences = known_columns
        .iter()
        .filter(|c| c.as_ref() == reference.name)
        .count();
    match reference.index {
        None => occurrences > 0,
        Some(i) => i < occurrences,
    }
}

/// Check a formula or template against the table's column names
///
/// `known_columns` lists source column names in declaration order,
/// duplicates included.
///
/// # Example
/// ```rust
/// use colcalc_formula::{check_formula, Diagnostic};
///
/// let problems = check_formula("=UPPER({Nmae})", &["Name"]);
/// assert_eq!(problems.len(), 1);
/// assert!(matches!(problems[0], Diagnostic::UnknownColumn(_)));
/// ```
pub fn check_formula<S: AsRef<str>>(formula: &str, known_columns: &[S]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let references = if formula.starts_with('=') {
        let expr = match parse_formula(formula) {
            Ok(expr) => expr,
            Err(e) => return vec![Diagnostic::Syntax(e.to_string())],
        };
        check_calls(&expr, &mut diagnostics);
        referenced_columns(&expr)
    } else {
        let mut refs = template_references(formula);
        let mut seen = Vec::with_capacity(refs.len());
        refs.retain(|r| {
            if seen.contains(r) {
                false
            } else {
                seen.push(r.clone());
                true
            }
        });
        refs
    };

    diagnostics.extend(
        references
            .into_iter()
            .filter(|r| !is_known(r, known_columns))
            .map(Diagnostic::UnknownColumn),
    );

    diagnostics
}
