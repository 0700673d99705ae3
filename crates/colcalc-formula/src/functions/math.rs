//! Numeric functions

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::arg;
use crate::error::FormulaResult;
use crate::value::{FormulaValue, Number};

/// Exact decimal form of a float's shortest representation
pub(crate) fn to_decimal(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    Decimal::from_str(&f.to_string()).ok()
}

/// Round half away from zero to `decimals` places (negative: tens, hundreds, ...)
///
/// Positive precision goes through `Decimal` so that `2.675` rounds to `2.68`
/// rather than to the binary neighbour.
pub(crate) fn round_half_away(f: f64, decimals: i64) -> f64 {
    if decimals >= 0 {
        let dp = decimals.min(28) as u32;
        if let Some(rounded) = to_decimal(f)
            .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|d| d.to_f64())
        {
            return rounded;
        }
        let factor = 10f64.powi(dp as i32);
        (f * factor).round() / factor
    } else {
        let factor = 10f64.powi(decimals.unsigned_abs().min(308) as i32);
        (f / factor).round() * factor
    }
}

/// ROUND for an already-coerced number
///
/// Integers are unchanged at non-negative precision. Precision of zero or
/// less produces an integer; positive precision a float.
pub fn round_number(n: Number, decimals: i64) -> Number {
    match n {
        Number::Int(i) if decimals >= 0 => Number::Int(i),
        _ if decimals > 0 => Number::Float(round_half_away(n.as_f64(), decimals)),
        _ => Number::from_integral_f64(round_half_away(n.as_f64(), decimals)),
    }
}

/// ROUND(n[, decimals])
pub fn fn_round(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let n = arg(args, 0).to_number();
    let decimals = args.get(1).map(|v| v.to_number().as_i64()).unwrap_or(0);
    Ok(round_number(n, decimals).into())
}

/// ABS(n)
pub fn fn_abs(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let result = match arg(args, 0).to_number() {
        Number::Int(i) => i
            .checked_abs()
            .map(Number::Int)
            .unwrap_or(Number::Float((i as f64).abs())),
        Number::Float(f) => Number::Float(f.abs()),
    };
    Ok(result.into())
}

/// FLOOR(n)
pub fn fn_floor(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let result = match arg(args, 0).to_number() {
        Number::Int(i) => Number::Int(i),
        Number::Float(f) => Number::from_integral_f64(f.floor()),
    };
    Ok(result.into())
}

/// CEIL(n)
pub fn fn_ceil(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let result = match arg(args, 0).to_number() {
        Number::Int(i) => Number::Int(i),
        Number::Float(f) => Number::from_integral_f64(f.ceil()),
    };
    Ok(result.into())
}

fn pick(args: &[FormulaValue], wanted: Ordering) -> Number {
    let mut best = arg(args, 0).to_number();
    for value in args.iter().skip(1) {
        let n = value.to_number();
        if n.compare(best) == Some(wanted) {
            best = n;
        }
    }
    best
}

/// MIN(a, b, ...)
pub fn fn_min(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(pick(args, Ordering::Less).into())
}

/// MAX(a, b, ...)
pub fn fn_max(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(pick(args, Ordering::Greater).into())
}

/// SUM(a, ...)
pub fn fn_sum(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let total = args
        .iter()
        .fold(Number::Int(0), |acc, v| acc.add(v.to_number()));
    Ok(total.into())
}
