use std::collections::BTreeMap;

use time::OffsetDateTime;

/// A time-indexed table of nullable values, one named column per series.
///
/// The index is strictly increasing and every column has exactly one value
/// per index entry. Columns are kept in name order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeriesTable {
    index: Vec<OffsetDateTime>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

/// Output of the outage aggregator.
pub type AvailabilityTimeSeries = TimeSeriesTable;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("index is not strictly increasing at position {0}")]
    UnsortedIndex(usize),
    #[error("column '{name}' has {len} values but the index has {expected}")]
    LengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },
}

impl TimeSeriesTable {
    pub fn try_new(
        index: Vec<OffsetDateTime>,
        columns: BTreeMap<String, Vec<Option<f64>>>,
    ) -> Result<Self, TableError> {
        if let Some(pos) = index.windows(2).position(|w| w[0] >= w[1]) {
            return Err(TableError::UnsortedIndex(pos + 1));
        }
        for (name, values) in &columns {
            if values.len() != index.len() {
                return Err(TableError::LengthMismatch {
                    name: name.clone(),
                    len: values.len(),
                    expected: index.len(),
                });
            }
        }
        Ok(Self { index, columns })
    }

    pub fn index(&self) -> &[OffsetDateTime] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Position of `ts` in the index, if it is an exact index entry.
    pub fn position(&self, ts: OffsetDateTime) -> Option<usize> {
        self.index.binary_search(&ts).ok()
    }

    /// Value of `column` at the exact index entry `ts`.
    pub fn get(&self, column: &str, ts: OffsetDateTime) -> Option<f64> {
        let pos = self.position(ts)?;
        self.columns.get(column)?.get(pos).copied().flatten()
    }
}
