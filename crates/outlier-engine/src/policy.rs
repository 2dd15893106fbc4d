//! Detection Policies and Treatments

use crate::statistics::ColumnStatistics;
use crate::OutlierError;
use sensor_series::Column;
use serde::{Deserialize, Serialize};

/// Quartiles and fence multiplier of the quantile policy
pub const DEFAULT_Q1: f64 = 0.25;
pub const DEFAULT_Q3: f64 = 0.75;
pub const DEFAULT_IQR_FACTOR: f64 = 1.5;

/// Sigma multiplier of the dispersion policy
pub const DEFAULT_N_SIGMA: f64 = 3.0;

/// How outlier bounds are derived from a column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutlierPolicy {
    /// `[Q1 - k·IQR, Q3 + k·IQR]`
    Quantile { q1: f64, q3: f64, k: f64 },
    /// `[mean - n·sd, mean + n·sd]` with the population standard deviation
    Dispersion { n_sigma: f64 },
    /// No detection; the series passes through
    Disabled,
}

impl OutlierPolicy {
    /// Quantile policy with the usual 0.25/0.75/1.5 fences
    pub fn quantile() -> Self {
        Self::Quantile {
            q1: DEFAULT_Q1,
            q3: DEFAULT_Q3,
            k: DEFAULT_IQR_FACTOR,
        }
    }

    /// Dispersion policy with `n_sigma` standard deviations
    pub fn dispersion(n_sigma: f64) -> Self {
        Self::Dispersion { n_sigma }
    }

    /// Reject parameters that cannot produce meaningful bounds
    pub fn check(&self) -> Result<(), OutlierError> {
        match *self {
            Self::Quantile { q1, q3, k } => {
                if !(0.0..=1.0).contains(&q1) || !(0.0..=1.0).contains(&q3) || q1 > q3 {
                    return Err(OutlierError::InvalidQuantiles { q1, q3 });
                }
                if !(k.is_finite() && k >= 0.0) {
                    return Err(OutlierError::InvalidFactor(k));
                }
                Ok(())
            }
            Self::Dispersion { n_sigma } => {
                if n_sigma.is_finite() && n_sigma > 0.0 {
                    Ok(())
                } else {
                    Err(OutlierError::InvalidSigma(n_sigma))
                }
            }
            Self::Disabled => Ok(()),
        }
    }

    /// Bounds for one column's present values; `None` when disabled or empty
    pub fn bounds(&self, column: Column, values: &[f64]) -> Option<ColumnBounds> {
        if values.is_empty() {
            return None;
        }

        let (lower, upper) = match *self {
            Self::Quantile { q1, q3, k } => {
                let lo = crate::statistics::quantile(values, q1);
                let hi = crate::statistics::quantile(values, q3);
                let iqr = hi - lo;
                (lo - k * iqr, hi + k * iqr)
            }
            Self::Dispersion { n_sigma } => {
                let stats = ColumnStatistics::compute(values);
                (
                    stats.mean - n_sigma * stats.std_dev,
                    stats.mean + n_sigma * stats.std_dev,
                )
            }
            Self::Disabled => return None,
        };

        Some(ColumnBounds {
            column,
            lower,
            upper,
        })
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        Self::dispersion(DEFAULT_N_SIGMA)
    }
}

/// What happens to a flagged value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Treatment {
    /// Drop the whole row when either reading is flagged
    #[default]
    Remove,
    /// Replace with the column mean
    Mean,
    /// Replace with the column median
    Median,
    /// Replace with the column mode
    Mode,
    /// Clamp to the nearest bound
    Limit,
}

impl std::str::FromStr for Treatment {
    type Err = OutlierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "remove" => Ok(Self::Remove),
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "mode" => Ok(Self::Mode),
            "limit" => Ok(Self::Limit),
            other => Err(OutlierError::UnknownTreatment(other.to_string())),
        }
    }
}

/// Outlier thresholds of one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnBounds {
    pub column: Column,
    pub lower: f64,
    pub upper: f64,
}

impl ColumnBounds {
    /// Whether a value lies outside `[lower, upper]`
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }

    /// Clamp a value into `[lower, upper]`
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_bounds() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let bounds = OutlierPolicy::quantile()
            .bounds(Column::Temperature, &values)
            .unwrap();
        // Q1 = 3, Q3 = 7, IQR = 4
        assert_eq!(bounds.lower, -3.0);
        assert_eq!(bounds.upper, 13.0);
    }

    #[test]
    fn test_dispersion_bounds() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let bounds = OutlierPolicy::dispersion(2.0)
            .bounds(Column::Humidity, &values)
            .unwrap();
        // mean 5, population sd 2
        assert!((bounds.lower - 1.0).abs() < 1e-12);
        assert!((bounds.upper - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_disabled_and_empty_have_no_bounds() {
        assert!(OutlierPolicy::Disabled
            .bounds(Column::Temperature, &[1.0, 2.0])
            .is_none());
        assert!(OutlierPolicy::quantile()
            .bounds(Column::Temperature, &[])
            .is_none());
    }

    #[test]
    fn test_policy_check() {
        assert!(OutlierPolicy::quantile().check().is_ok());
        assert!(OutlierPolicy::dispersion(3.0).check().is_ok());
        assert!(OutlierPolicy::dispersion(0.0).check().is_err());
        assert!(OutlierPolicy::dispersion(f64::NAN).check().is_err());
        assert!(OutlierPolicy::Quantile {
            q1: 0.8,
            q3: 0.2,
            k: 1.5
        }
        .check()
        .is_err());
    }

    #[test]
    fn test_treatment_from_str() {
        assert_eq!("limit".parse::<Treatment>().unwrap(), Treatment::Limit);
        assert_eq!("MODE".parse::<Treatment>().unwrap(), Treatment::Mode);
        assert!("drop".parse::<Treatment>().is_err());
    }
}
