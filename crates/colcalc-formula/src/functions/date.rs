//! Date/time typed casts
//!
//! Results are canonical text wrapped in a typed result:
//! - date: `YYYY-MM-DD`
//! - time: `HH:MM` (seconds are dropped)
//! - datetime: `YYYY-MM-DDTHH:MM`
//!
//! The parse helpers are shared with the storage formatter.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::arg;
use crate::error::{FormulaError, FormulaResult};
use crate::value::{FormulaValue, TypedKind, TypedResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const DATETIME_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn invalid(kind: &'static str, message: impl Into<String>) -> FormulaError {
    FormulaError::InvalidTemporal {
        kind,
        message: message.into(),
    }
}

fn non_blank<'a>(kind: &'static str, input: &'a str) -> FormulaResult<&'a str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(invalid(kind, "blank input"))
    } else {
        Ok(trimmed)
    }
}

fn parse_datetime_only(s: &str) -> Option<NaiveDateTime> {
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parse a date, or the date part of a datetime
pub fn parse_date(input: &str) -> FormulaResult<NaiveDate> {
    let s = non_blank("date", input)?;
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime_only(s).map(|dt| dt.date()))
        .ok_or_else(|| invalid("date", s))
}

/// Parse a time (`HH:MM` or `HH:MM:SS`), or the time part of a datetime
pub fn parse_time(input: &str) -> FormulaResult<NaiveTime> {
    let s = non_blank("time", input)?;
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, TIME_FORMAT))
        .ok()
        .or_else(|| parse_datetime_only(s).map(|dt| dt.time()))
        .ok_or_else(|| invalid("time", s))
}

/// Parse a datetime; a bare date means midnight
pub fn parse_datetime(input: &str) -> FormulaResult<NaiveDateTime> {
    let s = non_blank("datetime", input)?;
    parse_datetime_only(s)
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| invalid("datetime", s))
}

fn typed(kind: TypedKind, text: String) -> FormulaValue {
    FormulaValue::Typed(TypedResult::new(kind, FormulaValue::Text(text)))
}

fn int_arg(args: &[FormulaValue], index: usize) -> i64 {
    arg(args, index).to_number().as_i64()
}

/// DATE(text) or DATE(year, month, day)
pub fn fn_date(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let date = if args.len() == 3 {
        let (year, month, day) = (int_arg(args, 0), int_arg(args, 1), int_arg(args, 2));
        i32::try_from(year)
            .ok()
            .zip(u32::try_from(month).ok())
            .zip(u32::try_from(day).ok())
            .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d))
            .ok_or_else(|| invalid("date", format!("{:04}-{:02}-{:02}", year, month, day)))?
    } else {
        parse_date(&arg(args, 0).to_string())?
    };

    Ok(typed(TypedKind::Date, date.format(DATE_FORMAT).to_string()))
}

/// TIME(text) or TIME(hour, minute)
pub fn fn_time(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let time = if args.len() == 2 {
        let (hour, minute) = (int_arg(args, 0), int_arg(args, 1));
        u32::try_from(hour)
            .ok()
            .zip(u32::try_from(minute).ok())
            .and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
            .ok_or_else(|| invalid("time", format!("{:02}:{:02}", hour, minute)))?
    } else {
        parse_time(&arg(args, 0).to_string())?
    };

    Ok(typed(TypedKind::Time, time.format(TIME_FORMAT).to_string()))
}

/// DATETIME(text) or DATETIME(date, time)
pub fn fn_datetime(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let datetime = if args.len() == 2 {
        let date = parse_date(&arg(args, 0).to_string())?;
        let time = parse_time(&arg(args, 1).to_string())?;
        date.and_time(time)
    } else {
        parse_datetime(&arg(args, 0).to_string())?
    };

    Ok(typed(
        TypedKind::Datetime,
        datetime.format(DATETIME_FORMAT).to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(s: &str) -> FormulaValue {
        FormulaValue::text(s)
    }

    fn i(n: i64) -> FormulaValue {
        FormulaValue::Integer(n)
    }

    fn inner(value: FormulaValue) -> String {
        match value {
            FormulaValue::Typed(typed) => typed.value.to_string(),
            other => panic!("expected typed result, got {:?}", other),
        }
    }

    #[test]
    fn test_date_from_parts_and_text() {
        assert_eq!(inner(fn_date(&[i(2024), i(3), i(15)]).unwrap()), "2024-03-15");
        assert_eq!(inner(fn_date(&[t("2024-03-15")]).unwrap()), "2024-03-15");
        assert_eq!(inner(fn_date(&[t("2024-03-15T09:30")]).unwrap()), "2024-03-15");
        assert_eq!(
            fn_date(&[i(2024), i(3), i(15)]).unwrap(),
            fn_date(&[t("2024-03-15")]).unwrap()
        );
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(
            fn_date(&[t("  ")]).unwrap_err().to_string(),
            "Invalid date: blank input"
        );
        assert_eq!(
            fn_date(&[FormulaValue::Nil]).unwrap_err().to_string(),
            "Invalid date: blank input"
        );
        assert_eq!(
            fn_date(&[t("2024-02-30")]).unwrap_err().to_string(),
            "Invalid date: 2024-02-30"
        );
        assert_eq!(
            fn_date(&[i(2024), i(2), i(30)]).unwrap_err().to_string(),
            "Invalid date: 2024-02-30"
        );
        assert_eq!(
            fn_date(&[i(2024), i(-1), i(1)]).unwrap_err().to_string(),
            "Invalid date: 2024--1-01"
        );
    }

    #[test]
    fn test_time() {
        assert_eq!(inner(fn_time(&[i(9), i(5)]).unwrap()), "09:05");
        assert_eq!(inner(fn_time(&[t("14:30:59")]).unwrap()), "14:30");
        assert_eq!(inner(fn_time(&[t("2024-01-01 08:15")]).unwrap()), "08:15");
        assert_eq!(
            fn_time(&[i(24), i(0)]).unwrap_err().to_string(),
            "Invalid time: 24:00"
        );
        assert_eq!(
            fn_time(&[t("noon")]).unwrap_err().to_string(),
            "Invalid time: noon"
        );
    }

    #[test]
    fn test_datetime() {
        assert_eq!(
            inner(fn_datetime(&[t("2024-03-15T10:30")]).unwrap()),
            "2024-03-15T10:30"
        );
        assert_eq!(
            inner(fn_datetime(&[t("2024-03-15")]).unwrap()),
            "2024-03-15T00:00"
        );
        assert_eq!(
            inner(fn_datetime(&[t("2024-03-15"), t("18:45")]).unwrap()),
            "2024-03-15T18:45"
        );
        assert_eq!(
            fn_datetime(&[t("")]).unwrap_err().to_string(),
            "Invalid datetime: blank input"
        );
        assert_eq!(
            fn_datetime(&[t("2024-03-15"), t("")]).unwrap_err().to_string(),
            "Invalid time: blank input"
        );
    }
}
