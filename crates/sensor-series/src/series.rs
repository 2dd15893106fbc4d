//! Ordered Series of Records

use crate::{Column, Record};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Ordered sequence of records, indexed by stable row position
///
/// Stages mutate the series in place and never reorder it; timestamp repair
/// relies on row order approximating chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    records: Vec<Record>,
}

impl Series {
    /// Create a series from records in row order
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Timestamp column, missing entries as `None`
    pub fn timestamps(&self) -> Vec<Option<NaiveDateTime>> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    /// Reading column, missing entries as `None`
    pub fn column(&self, column: Column) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.value(column)).collect()
    }

    pub fn temperatures(&self) -> Vec<Option<f64>> {
        self.column(Column::Temperature)
    }

    pub fn humidities(&self) -> Vec<Option<f64>> {
        self.column(Column::Humidity)
    }

    /// Present readings of a column, in row order
    pub fn present_values(&self, column: Column) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.value(column)).collect()
    }

    /// Copy of the current state, kept by the driver for diagnostics
    pub fn snapshot(&self) -> Series {
        self.clone()
    }

    /// Row indices with at least one missing reading
    pub fn missing_reading_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.temperature.is_none() || r.humidity.is_none())
            .map(|(i, _)| i)
            .collect()
    }
}

impl From<Vec<Record>> for Series {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<Record> for Series {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
