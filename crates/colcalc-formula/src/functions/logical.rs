//! Logical and control functions
//!
//! All of these go through [`FormulaValue::is_truthy`].

use super::arg;
use crate::error::FormulaResult;
use crate::value::FormulaValue;

/// IF(cond, then[, else])
///
/// A missing else branch yields empty text.
pub fn fn_if(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    if arg(args, 0).is_truthy() {
        Ok(arg(args, 1).clone())
    } else {
        Ok(args
            .get(2)
            .cloned()
            .unwrap_or_else(|| FormulaValue::text("")))
    }
}

/// AND(a, b, ...)
pub fn fn_and(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Boolean(args.iter().all(FormulaValue::is_truthy)))
}

/// OR(a, b, ...)
pub fn fn_or(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Boolean(args.iter().any(FormulaValue::is_truthy)))
}

/// NOT(a)
pub fn fn_not(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Boolean(!arg(args, 0).is_truthy()))
}

/// COALESCE(a, ...): first truthy argument, else empty text
pub fn fn_coalesce(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(args
        .iter()
        .find(|v| v.is_truthy())
        .cloned()
        .unwrap_or_else(|| FormulaValue::text("")))
}
