//! Outlier Engine
//!
//! Computes per-column outlier bounds under a quantile or dispersion policy
//! and applies one of five treatments to the flagged readings.

mod engine;
mod policy;
mod statistics;

pub use engine::{Outlier, OutlierEngine, OutlierReport};
pub use policy::{
    ColumnBounds, OutlierPolicy, Treatment, DEFAULT_IQR_FACTOR, DEFAULT_N_SIGMA, DEFAULT_Q1,
    DEFAULT_Q3,
};
pub use statistics::{mean, median, mode, quantile, ColumnStatistics};

use thiserror::Error;

/// Outlier configuration errors
#[derive(Debug, Clone, Error)]
pub enum OutlierError {
    /// Sigma multiplier not finite and positive
    #[error("Dispersion multiplier must be finite and positive, got {0}")]
    InvalidSigma(f64),

    /// Quartile positions outside [0, 1] or inverted
    #[error("Invalid quantiles q1={q1}, q3={q3}")]
    InvalidQuantiles { q1: f64, q3: f64 },

    /// IQR fence factor negative or not finite
    #[error("IQR factor must be finite and non-negative, got {0}")]
    InvalidFactor(f64),

    /// Treatment name not recognized
    #[error("Unknown treatment '{0}' (expected remove, mean, median, mode or limit)")]
    UnknownTreatment(String),
}
