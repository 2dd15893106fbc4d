//! Data Validator for Range Checking

use crate::error::ValidationError;
use sensor_series::{Column, Series};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Temperature valid range (°C), inclusive
    pub temp_range: (f64, f64),
    /// Relative humidity valid range (%), inclusive
    pub hum_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            temp_range: (-20.0, 50.0),
            hum_range: (0.0, 100.0),
        }
    }
}

impl ValidationConfig {
    /// Range configured for a column
    pub fn range(&self, column: Column) -> (f64, f64) {
        match column {
            Column::Temperature => self.temp_range,
            Column::Humidity => self.hum_range,
        }
    }

    /// Reject inverted or non-finite ranges
    pub fn check(&self) -> Result<(), ValidationError> {
        for column in Column::ALL {
            let (min, max) = self.range(column);
            if !(min.is_finite() && max.is_finite() && min <= max) {
                return Err(ValidationError::InvalidRange { column, min, max });
            }
        }
        Ok(())
    }
}

/// A reading that was out of range and set to missing
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub index: usize,
    pub column: Column,
    pub value: f64,
}

/// Result of validating a series
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Series as it was before any reading was rejected
    pub before: Series,
    /// Readings set to missing
    pub rejected: Vec<Rejection>,
}

/// Range validator for temperature/humidity readings
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        column: Column,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                column,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate temperature
    pub fn validate_temperature(&self, temp: f64) -> Result<(), ValidationError> {
        self.validate_range(Column::Temperature, temp, self.config.temp_range)
    }

    /// Validate humidity
    pub fn validate_humidity(&self, hum: f64) -> Result<(), ValidationError> {
        self.validate_range(Column::Humidity, hum, self.config.hum_range)
    }

    /// Set every out-of-range reading to missing
    pub fn apply(&self, series: &mut Series) -> ValidationReport {
        let before = series.snapshot();
        let mut rejected = Vec::new();

        for (index, record) in series.records_mut().iter_mut().enumerate() {
            for column in Column::ALL {
                let slot = record.value_mut(column);
                let Some(value) = *slot else { continue };

                if let Err(err) = self.validate_range(column, value, self.config.range(column)) {
                    debug!("Row {}: {}", index, err);
                    *slot = None;
                    rejected.push(Rejection {
                        index,
                        column,
                        value,
                    });
                }
            }
        }

        info!(
            "Value validation accomplished. {} readings out of range set to missing",
            rejected.len()
        );
        ValidationReport { before, rejected }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_series::Record;

    #[test]
    fn test_valid_temperature() {
        let validator = Validator::default();
        assert!(validator.validate_temperature(21.0).is_ok());
        assert!(validator.validate_temperature(-20.0).is_ok());
        assert!(validator.validate_temperature(50.0).is_ok());
    }

    #[test]
    fn test_invalid_temperature() {
        let validator = Validator::default();
        assert!(validator.validate_temperature(-20.5).is_err());
        assert!(validator.validate_temperature(999.0).is_err());
    }

    #[test]
    fn test_humidity_range() {
        let validator = Validator::default();
        assert!(validator.validate_humidity(0.0).is_ok());
        assert!(validator.validate_humidity(100.0).is_ok());
        assert!(validator.validate_humidity(-1.0).is_err());
        assert!(validator.validate_humidity(101.0).is_err());
    }

    #[test]
    fn test_apply_marks_out_of_range_missing() {
        let validator = Validator::new(ValidationConfig {
            temp_range: (0.0, 50.0),
            hum_range: (0.0, 100.0),
        });
        let mut series: Series = [20.0, 21.0, 19.0, 999.0, 20.0]
            .into_iter()
            .map(|t| Record::new(None, Some(t), Some(50.0)))
            .collect();

        let report = validator.apply(&mut series);

        assert_eq!(
            series.temperatures(),
            vec![Some(20.0), Some(21.0), Some(19.0), None, Some(20.0)]
        );
        assert_eq!(
            report.rejected,
            vec![Rejection {
                index: 3,
                column: Column::Temperature,
                value: 999.0
            }]
        );
        assert_eq!(report.before.records()[3].temperature, Some(999.0));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = ValidationConfig {
            temp_range: (50.0, -20.0),
            ..Default::default()
        };
        assert!(matches!(
            config.check(),
            Err(ValidationError::InvalidRange {
                column: Column::Temperature,
                ..
            })
        ));
        assert!(ValidationConfig::default().check().is_ok());
    }
}
