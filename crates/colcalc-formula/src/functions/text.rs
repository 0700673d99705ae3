//! Text functions
//!
//! Arguments are stringified with the same rules as `&`; lengths and offsets
//! count characters, not bytes.

use super::arg;
use crate::error::FormulaResult;
use crate::value::FormulaValue;

fn text_arg(args: &[FormulaValue], index: usize) -> String {
    arg(args, index).to_string()
}

fn int_arg(args: &[FormulaValue], index: usize) -> i64 {
    arg(args, index).to_number().as_i64()
}

fn take_left(s: &str, n: i64) -> String {
    if n <= 0 {
        return String::new();
    }
    s.chars().take(n as usize).collect()
}

fn take_right(s: &str, n: i64) -> String {
    if n <= 0 {
        return String::new();
    }
    let len = s.chars().count();
    let n = n as usize;
    if n >= len {
        return s.to_string();
    }
    s.chars().skip(len - n).collect()
}

/// UPPER(text)
pub fn fn_upper(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Text(text_arg(args, 0).to_uppercase()))
}

/// LOWER(text)
pub fn fn_lower(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Text(text_arg(args, 0).to_lowercase()))
}

/// TRIM(text)
pub fn fn_trim(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::text(text_arg(args, 0).trim()))
}

/// LEN(text)
pub fn fn_len(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Integer(text_arg(args, 0).chars().count() as i64))
}

/// LEFT(text, n)
pub fn fn_left(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Text(take_left(&text_arg(args, 0), int_arg(args, 1))))
}

/// RIGHT(text, n): the whole text when `n` covers it
pub fn fn_right(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Text(take_right(&text_arg(args, 0), int_arg(args, 1))))
}

/// REPLACE(text, old, new[, count])
///
/// Without a count (or with a negative one) every occurrence is replaced.
pub fn fn_replace(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let text = text_arg(args, 0);
    let old = text_arg(args, 1);
    let new = text_arg(args, 2);

    let replaced = match args.get(3).map(|v| v.to_number().as_i64()) {
        Some(count) if count >= 0 => text.replacen(&old, &new, count as usize),
        _ => text.replace(&old, &new),
    };
    Ok(FormulaValue::Text(replaced))
}

/// CONTAINS(text, needle)
pub fn fn_contains(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let text = text_arg(args, 0);
    let needle = text_arg(args, 1);
    Ok(FormulaValue::Boolean(text.contains(needle.as_str())))
}

/// CONCAT(value, ...)
pub fn fn_concat(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Text(
        args.iter().map(|v| v.to_string()).collect::<String>(),
    ))
}

/// SPLIT(text, delimiter, index)
///
/// Negative indices count from the end; an out-of-range index is nil. An
/// empty delimiter splits into characters.
pub fn fn_split(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let text = text_arg(args, 0);
    let delimiter = text_arg(args, 1);
    let index = int_arg(args, 2);

    let parts: Vec<String> = if delimiter.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(delimiter.as_str()).map(String::from).collect()
    };

    let len = parts.len() as i64;
    let position = if index < 0 { index + len } else { index };
    if (0..len).contains(&position) {
        Ok(FormulaValue::Text(parts[position as usize].clone()))
    } else {
        Ok(FormulaValue::Nil)
    }
}
