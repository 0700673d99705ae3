//! Record type

use crate::error::{Error, Result};

/// One row of a table: the stored string value of each column, by position
///
/// Values are kept in their stored (string) form; typed interpretation is
/// left to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    values: Vec<Option<String>>,
}

impl Record {
    /// Create an empty record with room for `width` columns
    pub fn new(width: usize) -> Self {
        Self {
            values: vec![None; width],
        }
    }

    /// Create a record from stored values
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(|v| v.map(Into::into)).collect(),
        }
    }

    /// Number of column slots
    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// Stored value for a column, if set
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Set the stored value for a column
    pub fn set<S: Into<String>>(&mut self, index: usize, value: S) -> Result<()> {
        let width = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(Error::ColumnOutOfBounds(index, width))?;
        *slot = Some(value.into());
        Ok(())
    }

    /// Clear the stored value for a column
    pub fn clear(&mut self, index: usize) -> Result<()> {
        let width = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(Error::ColumnOutOfBounds(index, width))?;
        *slot = None;
        Ok(())
    }

    /// Grow the record to `width` slots; existing values are kept
    pub fn resize(&mut self, width: usize) {
        if width > self.values.len() {
            self.values.resize(width, None);
        }
    }

    /// Iterate over stored values in column order
    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        self.values.iter().map(|v| v.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get() {
        let mut record = Record::new(3);
        assert_eq!(record.get(0), None);
        record.set(0, "Alice").unwrap();
        assert_eq!(record.get(0), Some("Alice"));
        record.clear(0).unwrap();
        assert_eq!(record.get(0), None);
        assert!(record.set(3, "x").is_err());
    }

    #[test]
    fn test_from_values_and_resize() {
        let mut record = Record::from_values(vec![Some("a"), None]);
        assert_eq!(record.width(), 2);
        record.resize(4);
        assert_eq!(record.width(), 4);
        assert_eq!(record.get(0), Some("a"));
        record.resize(1);
        assert_eq!(record.width(), 4);
        let collected: Vec<Option<&str>> = record.values().collect();
        assert_eq!(collected, vec![Some("a"), None, None, None]);
    }
}
