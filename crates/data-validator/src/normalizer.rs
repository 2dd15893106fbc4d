//! Column Normalization of Raw Log Fields

use sensor_series::{NormalizedRecord, RawRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Field prefixes stripped before numeric coercion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationConfig {
    /// Prefix of the temperature field
    pub temp_prefix: String,
    /// Prefix of the humidity field
    pub hum_prefix: String,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            temp_prefix: "T=".to_string(),
            hum_prefix: "H=".to_string(),
        }
    }
}

/// Output of normalizing a batch of raw lines
#[derive(Debug, Clone, Default)]
pub struct NormalizationResult {
    pub records: Vec<NormalizedRecord>,
    /// Rows with at least one reading that did not parse
    pub missing_indices: Vec<usize>,
}

/// Strips prefixes, drops the trailing token and coerces readings to floats
pub struct Normalizer {
    config: NormalizationConfig,
}

impl Normalizer {
    /// Create a new normalizer
    pub fn new(config: NormalizationConfig) -> Self {
        Self { config }
    }

    /// Normalize one raw line
    pub fn normalize_record(&self, raw: &RawRecord) -> NormalizedRecord {
        NormalizedRecord {
            date: raw.date.clone(),
            time: raw.time.clone(),
            temperature: parse_reading(&raw.temp_raw, &self.config.temp_prefix),
            humidity: parse_reading(&raw.hum_raw, &self.config.hum_prefix),
        }
    }

    /// Normalize all raw lines, keeping row order
    pub fn normalize(&self, raw: &[RawRecord]) -> NormalizationResult {
        let records: Vec<NormalizedRecord> =
            raw.iter().map(|r| self.normalize_record(r)).collect();

        let missing_indices: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.temperature.is_none() || r.humidity.is_none())
            .map(|(i, _)| i)
            .collect();

        info!(
            "Data columns formatted. Empty values replaced with missing. Indices: {:?}",
            missing_indices
        );

        NormalizationResult {
            records,
            missing_indices,
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizationConfig::default())
    }
}

/// Parse a reading, stripping one leading prefix; empty, unparsable or
/// non-finite input is missing
pub fn parse_reading(field: &str, prefix: &str) -> Option<f64> {
    let trimmed = field.trim();
    let value = trimmed.strip_prefix(prefix).unwrap_or(trimmed).trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(temp: &str, hum: &str) -> RawRecord {
        RawRecord {
            date: "2021-03-01".into(),
            time: "10:00:00".into(),
            temp_raw: temp.into(),
            hum_raw: hum.into(),
            trailing: "TO".into(),
        }
    }

    #[test]
    fn test_prefixes_are_stripped() {
        let norm = Normalizer::default();
        let record = norm.normalize_record(&raw("T=21.5", "H=40.25"));
        assert_eq!(record.temperature, Some(21.5));
        assert_eq!(record.humidity, Some(40.25));
        assert_eq!(record.date, "2021-03-01");
    }

    #[test]
    fn test_unparsable_values_become_missing() {
        let norm = Normalizer::default();
        let result = norm.normalize(&[
            raw("T=21.5", "H=40"),
            raw("T=", "H=40"),
            raw("T=abc", "H=NaN"),
            raw("22.0", "H=41"),
        ]);

        assert_eq!(result.records[1].temperature, None);
        assert_eq!(result.records[2].temperature, None);
        assert_eq!(result.records[2].humidity, None);
        // Missing prefix still parses
        assert_eq!(result.records[3].temperature, Some(22.0));
        assert_eq!(result.missing_indices, vec![1, 2]);
    }

    #[test]
    fn test_negative_reading() {
        assert_eq!(parse_reading("T=-5.5", "T="), Some(-5.5));
        assert_eq!(parse_reading("   ", "T="), None);
        assert_eq!(parse_reading("T=inf", "T="), None);
    }
}
