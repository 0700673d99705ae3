//! Type inference and storage formatting
//!
//! Turns an evaluation result into the string written to the record and the
//! column type the computed column should be displayed as.

use colcalc_core::ColumnType;
use rust_decimal::RoundingStrategy;

use crate::functions::date::{
    parse_date, parse_datetime, parse_time, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT,
};
use crate::functions::math::to_decimal;
use crate::value::{FormulaValue, TypedKind};

/// Formatted result ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    /// Canonical stored text
    pub text: String,
    /// Inferred display type of the computed column
    pub result_type: ColumnType,
}

/// Declared type implied by a result
///
/// Typed results carry their own type; otherwise integers are `number`,
/// floats `decimal`, booleans `boolean` and anything else `text`.
pub fn infer_type(value: &FormulaValue) -> ColumnType {
    match value {
        FormulaValue::Typed(typed) => typed.kind.column_type(),
        FormulaValue::Integer(_) => ColumnType::Number,
        FormulaValue::Float(_) => ColumnType::Decimal,
        FormulaValue::Boolean(_) => ColumnType::Boolean,
        FormulaValue::Text(_) | FormulaValue::Nil => ColumnType::Text,
    }
}

/// Two-decimal fixed form, rounding half away from zero
pub fn format_currency(amount: f64) -> String {
    match to_decimal(amount) {
        Some(d) => {
            let mut rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(2);
            rounded.to_string()
        }
        None => format!("{:.2}", amount),
    }
}

fn format_temporal(kind: TypedKind, inner: &FormulaValue) -> String {
    let raw = inner.to_string();
    let canonical = match kind {
        TypedKind::Date => parse_date(&raw).map(|d| d.format(DATE_FORMAT).to_string()),
        TypedKind::Time => parse_time(&raw).map(|t| t.format(TIME_FORMAT).to_string()),
        TypedKind::Datetime => {
            parse_datetime(&raw).map(|dt| dt.format(DATETIME_FORMAT).to_string())
        }
        TypedKind::Currency => Ok(raw.clone()),
    };
    // Cast functions already produce canonical text
    canonical.unwrap_or(raw)
}

/// Format a result for storage
///
/// # Example
/// ```rust
/// use colcalc_core::ColumnType;
/// use colcalc_formula::{evaluate, format_for_storage, Environment};
///
/// let stored = format_for_storage(&evaluate("=CURRENCY(10)", &Environment::new()));
/// assert_eq!(stored.text, "10.00");
/// assert_eq!(stored.result_type, ColumnType::Currency);
/// ```
pub fn format_for_storage(value: &FormulaValue) -> StoredValue {
    let result_type = infer_type(value);
    let text = match value {
        FormulaValue::Typed(typed) => match typed.kind {
            TypedKind::Currency => format_currency(typed.value.to_number().as_f64()),
            kind => format_temporal(kind, typed.value.plain()),
        },
        FormulaValue::Boolean(true) => "1".to_string(),
        FormulaValue::Boolean(false) => "0".to_string(),
        other => other.to_string(),
    };

    StoredValue { text, result_type }
}
