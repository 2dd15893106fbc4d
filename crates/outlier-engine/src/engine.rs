//! Outlier Detection and Treatment

use crate::policy::{ColumnBounds, OutlierPolicy, Treatment};
use crate::statistics;
use crate::OutlierError;
use sensor_series::{Column, Series};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// A reading that fell outside its column's bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    /// Row index before treatment
    pub index: usize,
    pub column: Column,
    pub value: f64,
}

/// Outcome of one detection/treatment pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierReport {
    pub policy: OutlierPolicy,
    pub treatment: Treatment,
    /// Bounds per column, computed before any value changed
    pub bounds: Vec<ColumnBounds>,
    pub outliers: Vec<Outlier>,
    pub rows_removed: usize,
}

impl OutlierReport {
    /// Bounds used for a column, if it had any present values
    pub fn bounds_for(&self, column: Column) -> Option<&ColumnBounds> {
        self.bounds.iter().find(|b| b.column == column)
    }
}

/// Detects outliers under one policy and handles them with one treatment
pub struct OutlierEngine {
    policy: OutlierPolicy,
    treatment: Treatment,
}

impl OutlierEngine {
    /// Create an engine, rejecting unusable policy parameters
    pub fn new(policy: OutlierPolicy, treatment: Treatment) -> Result<Self, OutlierError> {
        policy.check()?;
        Ok(Self { policy, treatment })
    }

    pub fn policy(&self) -> OutlierPolicy {
        self.policy
    }

    pub fn treatment(&self) -> Treatment {
        self.treatment
    }

    /// Bounds for every column with present values, from the current data
    pub fn bounds(&self, series: &Series) -> Vec<ColumnBounds> {
        Column::ALL
            .into_iter()
            .filter_map(|column| self.policy.bounds(column, &series.present_values(column)))
            .collect()
    }

    /// Flag readings outside the bounds; missing readings are never flagged
    pub fn detect(&self, series: &Series, bounds: &[ColumnBounds]) -> Vec<Outlier> {
        let mut outliers = Vec::new();
        for (index, record) in series.iter().enumerate() {
            for b in bounds {
                if let Some(value) = record.value(b.column) {
                    if b.is_outlier(value) {
                        outliers.push(Outlier {
                            index,
                            column: b.column,
                            value,
                        });
                    }
                }
            }
        }
        outliers
    }

    /// Detect and treat outliers in place
    pub fn apply(&self, series: &mut Series) -> OutlierReport {
        let bounds = self.bounds(series);
        let outliers = self.detect(series, &bounds);
        for b in &bounds {
            info!(
                "{} outlier bounds: [{:.3}, {:.3}]",
                b.column, b.lower, b.upper
            );
        }

        let rows_removed = if outliers.is_empty() {
            0
        } else {
            self.treat(series, &bounds, &outliers)
        };

        if self.policy.is_enabled() {
            info!(
                "Outliers treated ({:?}): {} values flagged, {} rows removed",
                self.treatment,
                outliers.len(),
                rows_removed
            );
        } else {
            info!("Outlier treatment disabled");
        }

        OutlierReport {
            policy: self.policy,
            treatment: self.treatment,
            bounds,
            outliers,
            rows_removed,
        }
    }

    fn treat(&self, series: &mut Series, bounds: &[ColumnBounds], outliers: &[Outlier]) -> usize {
        match self.treatment {
            Treatment::Remove => {
                let flagged: HashSet<usize> = outliers.iter().map(|o| o.index).collect();
                let before = series.len();
                let mut index = 0;
                series.records_mut().retain(|_| {
                    let keep = !flagged.contains(&index);
                    index += 1;
                    keep
                });
                before - series.len()
            }
            Treatment::Limit => {
                for outlier in outliers {
                    if let Some(b) = bounds.iter().find(|b| b.column == outlier.column) {
                        let clamped = b.clamp(outlier.value);
                        debug!(
                            "Row {} {}: {} clamped to {}",
                            outlier.index, outlier.column, outlier.value, clamped
                        );
                        *series.records_mut()[outlier.index].value_mut(outlier.column) =
                            Some(clamped);
                    }
                }
                0
            }
            Treatment::Mean => Self::replace(series, bounds, outliers, statistics::mean),
            Treatment::Median => Self::replace(series, bounds, outliers, statistics::median),
            Treatment::Mode => Self::replace(series, bounds, outliers, statistics::mode),
        }
    }

    /// Overwrite flagged values with a column statistic
    ///
    /// The statistic is taken over the column's in-bound values, or over all of
    /// them when none are in bounds.
    fn replace(
        series: &mut Series,
        bounds: &[ColumnBounds],
        outliers: &[Outlier],
        statistic: fn(&[f64]) -> f64,
    ) -> usize {
        for b in bounds {
            let all = series.present_values(b.column);
            let inliers: Vec<f64> = all.iter().copied().filter(|&v| !b.is_outlier(v)).collect();
            let replacement = statistic(if inliers.is_empty() { &all } else { &inliers });

            for outlier in outliers.iter().filter(|o| o.column == b.column) {
                debug!(
                    "Row {} {}: {} replaced with {}",
                    outlier.index, outlier.column, outlier.value, replacement
                );
                *series.records_mut()[outlier.index].value_mut(outlier.column) = Some(replacement);
            }
        }
        0
    }
}
