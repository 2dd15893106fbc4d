//! Linear Interpolation of Missing Readings

use sensor_series::{Column, Series};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Treatment of missing runs at the start or end of a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Runs without a bracket on one side stay missing
    #[default]
    Leave,
    /// Runs without a bracket copy the nearest present value
    Hold,
}

/// Indices filled per column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpolationReport {
    pub temperature: Vec<usize>,
    pub humidity: Vec<usize>,
    /// Indices still missing after interpolation
    pub unresolved: Vec<(usize, Column)>,
}

impl InterpolationReport {
    fn filled_mut(&mut self, column: Column) -> &mut Vec<usize> {
        match column {
            Column::Temperature => &mut self.temperature,
            Column::Humidity => &mut self.humidity,
        }
    }
}

/// Fills missing readings by linear interpolation over the row index
pub struct Interpolator {
    edge: EdgePolicy,
}

impl Interpolator {
    pub fn new(edge: EdgePolicy) -> Self {
        Self { edge }
    }

    /// Interpolate both columns independently
    pub fn apply(&self, series: &mut Series) -> InterpolationReport {
        let mut report = InterpolationReport::default();

        for column in Column::ALL {
            let mut values = series.column(column);
            let filled = interpolate_linear(&mut values, self.edge);

            for (record, value) in series.records_mut().iter_mut().zip(&values) {
                *record.value_mut(column) = *value;
            }
            for (index, value) in values.iter().enumerate() {
                if value.is_none() {
                    report.unresolved.push((index, column));
                }
            }
            debug!("{}: interpolated indices {:?}", column, filled);
            *report.filled_mut(column) = filled;
        }

        if !report.unresolved.is_empty() {
            info!(
                "{} readings at the series edges remain missing",
                report.unresolved.len()
            );
        }
        info!(
            "Interpolation of missing values accomplished ({} temperature, {} humidity)",
            report.temperature.len(),
            report.humidity.len()
        );
        report
    }
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new(EdgePolicy::default())
    }
}

/// Fill `None` entries in place; returns the filled indices
///
/// Interior runs are interpolated between their bracketing values by row
/// distance. A column with no present value is left untouched.
pub fn interpolate_linear(values: &mut [Option<f64>], edge: EdgePolicy) -> Vec<usize> {
    let present: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();

    let (Some(&first), Some(&last)) = (present.first(), present.last()) else {
        return Vec::new();
    };

    let mut filled = Vec::new();

    for pair in present.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        if right - left < 2 {
            continue;
        }
        let (Some(y0), Some(y1)) = (values[left], values[right]) else {
            continue;
        };
        let span = (right - left) as f64;
        for i in left + 1..right {
            let frac = (i - left) as f64 / span;
            values[i] = Some(y0 + (y1 - y0) * frac);
            filled.push(i);
        }
    }

    if edge == EdgePolicy::Hold {
        let (head, tail) = (values[first], values[last]);
        values[..first].fill(head);
        values[last + 1..].fill(tail);
        filled.extend(0..first);
        filled.extend(last + 1..values.len());
    }

    filled.sort_unstable();
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sensor_series::Record;

    #[test]
    fn test_midpoint_fill() {
        let mut values = vec![Some(20.0), Some(21.0), Some(19.0), None, Some(20.0)];
        let filled = interpolate_linear(&mut values, EdgePolicy::Leave);
        assert_eq!(filled, vec![3]);
        assert_eq!(values[3], Some(19.5));
    }

    #[test]
    fn test_run_is_spread_by_row_distance() {
        let mut values = vec![Some(0.0), None, None, None, Some(8.0)];
        interpolate_linear(&mut values, EdgePolicy::Leave);
        assert_eq!(values, vec![Some(0.0), Some(2.0), Some(4.0), Some(6.0), Some(8.0)]);
    }

    #[test]
    fn test_edges_left_missing() {
        let mut values = vec![None, Some(1.0), None, Some(3.0), None];
        let filled = interpolate_linear(&mut values, EdgePolicy::Leave);
        assert_eq!(filled, vec![2]);
        assert_eq!(values, vec![None, Some(1.0), Some(2.0), Some(3.0), None]);
    }

    #[test]
    fn test_edges_hold_nearest() {
        let mut values = vec![None, Some(1.0), None, Some(3.0), None, None];
        let filled = interpolate_linear(&mut values, EdgePolicy::Hold);
        assert_eq!(filled, vec![0, 2, 4, 5]);
        assert_eq!(
            values,
            vec![Some(1.0), Some(1.0), Some(2.0), Some(3.0), Some(3.0), Some(3.0)]
        );
    }

    #[test]
    fn test_all_missing_untouched() {
        let mut values = vec![None, None];
        assert!(interpolate_linear(&mut values, EdgePolicy::Hold).is_empty());
        assert_eq!(values, vec![None, None]);
    }

    #[test]
    fn test_columns_are_independent() {
        let mut series = Series::new(vec![
            Record::new(None, Some(10.0), None),
            Record::new(None, None, Some(50.0)),
            Record::new(None, Some(12.0), Some(52.0)),
        ]);

        let report = Interpolator::default().apply(&mut series);

        assert_eq!(series.temperatures(), vec![Some(10.0), Some(11.0), Some(12.0)]);
        assert_eq!(series.humidities(), vec![None, Some(50.0), Some(52.0)]);
        assert_eq!(report.temperature, vec![1]);
        assert!(report.humidity.is_empty());
        assert_eq!(report.unresolved, vec![(0, Column::Humidity)]);
    }

    proptest! {
        #[test]
        fn prop_fill_stays_within_present_range(
            values in prop::collection::vec(prop::option::of(-50.0f64..50.0), 1..64),
            hold in any::<bool>(),
        ) {
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            let edge = if hold { EdgePolicy::Hold } else { EdgePolicy::Leave };
            let mut filled_values = values.clone();

            let filled = interpolate_linear(&mut filled_values, edge);

            for (i, original) in values.iter().enumerate() {
                if original.is_some() {
                    prop_assert_eq!(filled_values[i], *original);
                }
            }
            if let (Some(lo), Some(hi)) = (
                present.iter().copied().reduce(f64::min),
                present.iter().copied().reduce(f64::max),
            ) {
                for &i in &filled {
                    let v = filled_values[i].unwrap();
                    prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
                }
                if hold {
                    prop_assert!(filled_values.iter().all(Option::is_some));
                }
            } else {
                prop_assert!(filled.is_empty());
            }
        }
    }
}
