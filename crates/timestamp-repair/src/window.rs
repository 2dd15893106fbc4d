//! Validity Window

use crate::StructuralError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Bounds of the first and last rows whose timestamp parsed
///
/// Invariant: `first_valid_index <= last_valid_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub first_valid_index: usize,
    pub start_time: NaiveDateTime,
    pub last_valid_index: usize,
    pub end_time: NaiveDateTime,
}

impl ValidityWindow {
    /// Scan forward for the first present timestamp and backward for the last
    pub fn scan(timestamps: &[Option<NaiveDateTime>]) -> Result<Self, StructuralError> {
        let no_valid = || StructuralError::NoValidTimestamp {
            rows: timestamps.len(),
        };

        let (first_valid_index, start_time) = timestamps
            .iter()
            .enumerate()
            .find_map(|(i, t)| t.map(|t| (i, t)))
            .ok_or_else(no_valid)?;

        let (last_valid_index, end_time) = timestamps
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, t)| t.map(|t| (i, t)))
            .ok_or_else(no_valid)?;

        Ok(Self {
            first_valid_index,
            start_time,
            last_valid_index,
            end_time,
        })
    }

    /// Number of row steps between the first and last valid rows
    pub fn steps(&self) -> usize {
        self.last_valid_index - self.first_valid_index
    }

    /// Whether both ends are the same row
    pub fn is_degenerate(&self) -> bool {
        self.first_valid_index == self.last_valid_index
    }
}
