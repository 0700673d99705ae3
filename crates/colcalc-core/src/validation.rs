//! Stored-value validation
//!
//! Columns may carry a [`ValueFormat`] that every stored value must satisfy,
//! and typed columns (numbers, booleans, dates, ...) have a fixed shape.
//!
//! User-supplied patterns are untrusted. They are compiled with a size limit
//! and matched against a time budget, and any failure along the way (bad
//! syntax, oversized program, overlong input, budget exceeded) rejects the
//! value rather than accepting it.
//!
//! ## Example
//!
//! ```rust
//! use colcalc_core::{validate_format, ValidationOptions, ValueFormat};
//!
//! let format = ValueFormat::Pattern("[A-Z]{3}-[0-9]{4}".into());
//! let opts = ValidationOptions::default();
//! assert!(validate_format(&format, "ABC-1234", &opts).is_valid());
//! assert!(!validate_format(&format, "abc-1234", &opts).is_valid());
//! ```

use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lazy_regex::regex_is_match;
use regex::RegexBuilder;

use crate::column::ColumnType;

/// Format check attached to a column
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueFormat {
    /// Value must match the whole pattern
    Pattern(String),
    /// Value must look like an email address
    Email,
    /// Value must look like an http(s) URL
    Url,
}

/// Limits applied when checking user-supplied patterns
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Maximum compiled program size in bytes
    pub size_limit: usize,
    /// Maximum length of the value being checked, in bytes
    pub max_input_len: usize,
    /// Wall-clock budget for a single match
    pub time_budget: Duration,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            size_limit: 1 << 20,
            max_input_len: 64 * 1024,
            time_budget: Duration::from_millis(50),
        }
    }
}

/// Result of a validation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Value accepted
    Valid,
    /// Value rejected, with the reason
    Invalid(String),
}

impl ValidationOutcome {
    /// Check if the value was accepted
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Rejection reason, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(msg) => Some(msg),
        }
    }

    fn invalid<S: Into<String>>(msg: S) -> Self {
        ValidationOutcome::Invalid(msg.into())
    }
}

/// Check a value against a column's format
///
/// Empty values are accepted; required-ness is a separate concern.
pub fn validate_format(
    format: &ValueFormat,
    value: &str,
    options: &ValidationOptions,
) -> ValidationOutcome {
    if value.is_empty() {
        return ValidationOutcome::Valid;
    }

    match format {
        ValueFormat::Email => {
            if regex_is_match!(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", value) {
                ValidationOutcome::Valid
            } else {
                ValidationOutcome::invalid("Not a valid email address")
            }
        }
        ValueFormat::Url => {
            if regex_is_match!(r"^https?://[^\s/$.?#][^\s]*$"i, value) {
                ValidationOutcome::Valid
            } else {
                ValidationOutcome::invalid("Not a valid URL")
            }
        }
        ValueFormat::Pattern(pattern) => match_pattern(pattern, value, options),
    }
}

fn match_pattern(pattern: &str, value: &str, options: &ValidationOptions) -> ValidationOutcome {
    if value.len() > options.max_input_len {
        return ValidationOutcome::invalid("Pattern check timed out: value too long");
    }

    let anchored = format!("^(?:{})$", pattern);
    let regex = match RegexBuilder::new(&anchored)
        .size_limit(options.size_limit)
        .dfa_size_limit(options.size_limit)
        .build()
    {
        Ok(regex) => regex,
        Err(e) => return ValidationOutcome::invalid(format!("Invalid pattern: {}", e)),
    };

    let started = Instant::now();
    let matched = regex.is_match(value);
    if started.elapsed() > options.time_budget {
        return ValidationOutcome::invalid("Pattern check timed out");
    }

    if matched {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::invalid(format!("Value does not match pattern {}", pattern))
    }
}

/// Check that a stored value has the shape its column type requires
///
/// Empty values are accepted for every type.
pub fn validate_type(column_type: ColumnType, value: &str) -> ValidationOutcome {
    if value.is_empty() {
        return ValidationOutcome::Valid;
    }

    let ok = match column_type {
        ColumnType::Number => value.parse::<i64>().is_ok(),
        ColumnType::Decimal | ColumnType::Currency => value.parse::<f64>().is_ok(),
        ColumnType::Boolean => value == "1" || value == "0",
        ColumnType::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        ColumnType::Time => NaiveTime::parse_from_str(value, "%H:%M").is_ok(),
        ColumnType::Datetime => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok(),
        ColumnType::Text
        | ColumnType::Email
        | ColumnType::Url
        | ColumnType::Select
        | ColumnType::Link => true,
    };

    if ok {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::invalid(format!("Expected a {} value", column_type))
    }
}
