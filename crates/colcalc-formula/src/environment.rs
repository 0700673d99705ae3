//! Value environment
//!
//! The read-only mapping from lookup key to value that a formula is evaluated
//! against. Keys are bare column names and `name[index]` variants.

use ahash::AHashMap;
use colcalc_core::{ColumnType, Record, Table};

use crate::ast::environment_key;
use crate::value::FormulaValue;

/// Column values for one record
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: AHashMap<String, FormulaValue>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under a raw key (`Name` or `Name[1]`)
    pub fn insert<K: Into<String>, V: Into<FormulaValue>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with<K: Into<String>, V: Into<FormulaValue>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Get the value stored under a raw key
    pub fn get(&self, key: &str) -> Option<&FormulaValue> {
        self.values.get(key)
    }

    /// Resolve a column reference; unmapped references are nil
    pub fn lookup(&self, name: &str, index: Option<usize>) -> FormulaValue {
        let found = match index {
            None => self.values.get(name),
            Some(_) => self.values.get(&environment_key(name, index)),
        };
        found.cloned().unwrap_or(FormulaValue::Nil)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over keys and values, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormulaValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build an environment from column values in declaration order
    ///
    /// The first column of each name is published under its bare name; every
    /// column is published under `name[i]`, where `i` counts earlier columns
    /// with the same name.
    pub fn from_columns<'a, I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, FormulaValue)>,
    {
        let mut env = Self::new();
        let mut occurrences: AHashMap<&'a str, usize> = AHashMap::new();

        for (name, value) in columns {
            let seen = occurrences.entry(name).or_insert(0);
            if *seen == 0 {
                env.values.insert(name.to_string(), value.clone());
            }
            env.values.insert(environment_key(name, Some(*seen)), value);
            *seen += 1;
        }

        env
    }

    /// Build the environment for one record from the table's source columns
    ///
    /// Computed columns are skipped, so formulas never see each other's output.
    pub fn for_record(table: &Table, record: &Record) -> Self {
        Self::from_columns(table.source_columns().map(|(index, column)| {
            (
                column.name.as_str(),
                coerce_stored_value(column.column_type, record.get(index)),
            )
        }))
    }
}

impl<K: Into<String>, V: Into<FormulaValue>> FromIterator<(K, V)> for Environment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut env = Self::new();
        for (key, value) in iter {
            env.insert(key, value);
        }
        env
    }
}

/// Coerce a stored string into a value according to its column type
///
/// - `boolean`: true only for `"1"`
/// - `number`: integer, or nil when missing or unparsable
/// - `decimal` / `currency`: float, or nil when missing or unparsable
/// - anything else: the raw text, or nil when missing or empty
pub fn coerce_stored_value(column_type: ColumnType, raw: Option<&str>) -> FormulaValue {
    match column_type {
        ColumnType::Boolean => FormulaValue::Boolean(raw == Some("1")),
        ColumnType::Number => raw
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(FormulaValue::Integer)
            .unwrap_or(FormulaValue::Nil),
        ColumnType::Decimal | ColumnType::Currency => raw
            .and_then(|s| s.trim().parse::<f64>().ok())
            .map(FormulaValue::Float)
            .unwrap_or(FormulaValue::Nil),
        _ => match raw {
            Some(s) if !s.is_empty() => FormulaValue::text(s),
            _ => FormulaValue::Nil,
        },
    }
}
