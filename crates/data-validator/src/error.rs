//! Validation Error Types

use sensor_series::Column;
use thiserror::Error;

/// Errors during data validation
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{column} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        column: Column,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Range whose lower bound exceeds its upper bound
    #[error("Invalid {column} range [{min}, {max}]")]
    InvalidRange { column: Column, min: f64, max: f64 },
}
