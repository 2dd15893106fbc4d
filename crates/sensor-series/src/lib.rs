//! Sensor Series Model
//!
//! Row types shared by every pipeline stage, plus the deduplicator.

mod dedup;
mod series;

pub use dedup::{dedup, DedupKey};
pub use series::Series;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One line of the sensor log as loaded, before any coercion
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: String,
    pub time: String,
    /// Temperature field, still carrying its `T=` prefix
    pub temp_raw: String,
    /// Humidity field, still carrying its `H=` prefix
    pub hum_raw: String,
    pub trailing: String,
}

/// Row after column normalization: readings parsed, date and time not yet merged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub date: String,
    pub time: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// One row of the series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: Option<NaiveDateTime>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl Record {
    pub fn new(
        timestamp: Option<NaiveDateTime>,
        temperature: Option<f64>,
        humidity: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            temperature,
            humidity,
        }
    }

    /// Reading held in the given column
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Temperature => self.temperature,
            Column::Humidity => self.humidity,
        }
    }

    /// Mutable slot of the given column
    pub fn value_mut(&mut self, column: Column) -> &mut Option<f64> {
        match column {
            Column::Temperature => &mut self.temperature,
            Column::Humidity => &mut self.humidity,
        }
    }
}

/// Numeric columns of the series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Temperature,
    Humidity,
}

impl Column {
    /// Both columns, in output order
    pub const ALL: [Column; 2] = [Column::Temperature, Column::Humidity];

    /// Header used in the output table and plots
    pub fn name(self) -> &'static str {
        match self {
            Column::Temperature => "Temp",
            Column::Humidity => "Hum",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
