//! Cast functions
//!
//! `NUMBER`, `TEXT` and `BOOLEAN` produce bare values. `CURRENCY` is the one
//! non-temporal typed cast; the temporal ones live in [`super::date`].

use super::arg;
use crate::error::FormulaResult;
use crate::value::{FormulaValue, TypedKind, TypedResult};

/// NUMBER(x)
pub fn fn_number(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(arg(args, 0).to_number().into())
}

/// TEXT(x)
pub fn fn_text(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Text(arg(args, 0).to_string()))
}

/// BOOLEAN(x)
pub fn fn_boolean(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Boolean(arg(args, 0).is_truthy()))
}

/// CURRENCY(x): the value as a float, typed as currency
pub fn fn_currency(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let amount = arg(args, 0).to_number().as_f64();
    Ok(FormulaValue::Typed(TypedResult::new(
        TypedKind::Currency,
        FormulaValue::Float(amount),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_casts() {
        assert_eq!(
            fn_number(&[FormulaValue::text("12")]).unwrap(),
            FormulaValue::Integer(12)
        );
        assert_eq!(
            fn_number(&[FormulaValue::text("1.5")]).unwrap(),
            FormulaValue::Float(1.5)
        );
        assert_eq!(
            fn_text(&[FormulaValue::Float(3.0)]).unwrap(),
            FormulaValue::text("3.0")
        );
        assert_eq!(
            fn_boolean(&[FormulaValue::text("0")]).unwrap(),
            FormulaValue::Boolean(false)
        );
    }

    #[test]
    fn test_currency_is_typed_float() {
        assert_eq!(
            fn_currency(&[FormulaValue::Integer(10)]).unwrap(),
            FormulaValue::Typed(TypedResult::new(
                TypedKind::Currency,
                FormulaValue::Float(10.0)
            ))
        );
    }
}
