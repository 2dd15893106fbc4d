//! Inter-Sample Gap Estimation

use crate::{StructuralError, ValidityWindow};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// How the typical sample spacing is derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapMethod {
    /// Median of per-step differences between successive valid timestamps
    #[default]
    Median,
    /// Window span divided by the number of row steps it covers
    Span,
}

/// Typical spacing between consecutive samples, rounded to whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapEstimate {
    pub gap: Duration,
    /// Method that produced `gap`; `Span` when the median fell back
    pub method: GapMethod,
}

impl GapEstimate {
    /// Estimate the gap from the parsed timestamps and their validity window
    ///
    /// The median is taken over `(t_b - t_a) / (b - a)` for every pair of
    /// successive present timestamps at rows `a < b`, so a single corrupt
    /// endpoint cannot skew it. A non-positive median falls back to the span.
    pub fn estimate(
        timestamps: &[Option<NaiveDateTime>],
        window: &ValidityWindow,
        method: GapMethod,
    ) -> Result<Self, StructuralError> {
        if window.is_degenerate() {
            return Err(StructuralError::DegenerateWindow {
                index: window.first_valid_index,
            });
        }

        if method == GapMethod::Median {
            if let Some(gap) = median_step_ms(timestamps).map(round_to_seconds) {
                if gap > Duration::zero() {
                    return Ok(Self {
                        gap,
                        method: GapMethod::Median,
                    });
                }
            }
        }

        let span_ms = (window.end_time - window.start_time).num_milliseconds() as f64;
        let gap = round_to_seconds(span_ms / window.steps() as f64);
        if gap <= Duration::zero() {
            return Err(StructuralError::NonPositiveGap {
                gap_ms: gap.num_milliseconds(),
            });
        }

        Ok(Self {
            gap,
            method: GapMethod::Span,
        })
    }

    /// Gap in whole seconds
    pub fn seconds(&self) -> i64 {
        self.gap.num_seconds()
    }
}

/// Median per-row-step difference in milliseconds
fn median_step_ms(timestamps: &[Option<NaiveDateTime>]) -> Option<f64> {
    let present: Vec<(usize, NaiveDateTime)> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.map(|t| (i, t)))
        .collect();

    let mut steps: Vec<f64> = present
        .windows(2)
        .map(|pair| {
            let (a, ta) = pair[0];
            let (b, tb) = pair[1];
            (tb - ta).num_milliseconds() as f64 / (b - a) as f64
        })
        .collect();

    median(&mut steps)
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn round_to_seconds(ms: f64) -> Duration {
    Duration::seconds((ms / 1000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn secs(s: i64) -> Option<NaiveDateTime> {
        Some(base() + Duration::seconds(s))
    }

    fn estimate(timestamps: &[Option<NaiveDateTime>], method: GapMethod) -> GapEstimate {
        let window = ValidityWindow::scan(timestamps).unwrap();
        GapEstimate::estimate(timestamps, &window, method).unwrap()
    }

    #[test]
    fn test_median_of_regular_grid() {
        let timestamps = vec![secs(0), secs(60), None, secs(180), secs(240)];
        let est = estimate(&timestamps, GapMethod::Median);
        assert_eq!(est.gap, Duration::seconds(60));
        assert_eq!(est.method, GapMethod::Median);
    }

    #[test]
    fn test_span_formula() {
        // (300 - 0) / (4 - 0) = 75s
        let timestamps = vec![secs(0), secs(10), secs(20), secs(30), secs(300)];
        let est = estimate(&timestamps, GapMethod::Span);
        assert_eq!(est.gap, Duration::seconds(75));
        assert_eq!(est.method, GapMethod::Span);
    }

    #[test]
    fn test_span_rounds_to_nearest_second() {
        // 100s over 3 steps = 33.33s
        let timestamps = vec![secs(0), None, None, secs(100)];
        assert_eq!(estimate(&timestamps, GapMethod::Span).seconds(), 33);
    }

    #[test]
    fn test_corrupt_endpoint_skews_span_not_median() {
        let mut timestamps: Vec<_> = (0..10).map(|i| secs(i * 60)).collect();
        timestamps[9] = secs(86_400);

        assert_eq!(estimate(&timestamps, GapMethod::Median).seconds(), 60);
        assert_ne!(estimate(&timestamps, GapMethod::Span).seconds(), 60);
    }

    #[test]
    fn test_median_independent_of_which_end_is_corrupt() {
        let mut head_bad: Vec<_> = (0..10).map(|i| secs(1_000 + i * 30)).collect();
        head_bad[0] = secs(0);
        let mut tail_bad: Vec<_> = (0..10).map(|i| secs(1_000 + i * 30)).collect();
        tail_bad[9] = secs(90_000);

        assert_eq!(
            estimate(&head_bad, GapMethod::Median),
            estimate(&tail_bad, GapMethod::Median)
        );
    }

    #[test]
    fn test_non_positive_median_falls_back_to_span() {
        // Steps: -10, -10, +400 -> median negative
        let timestamps = vec![secs(100), secs(90), secs(80), secs(480)];
        let est = estimate(&timestamps, GapMethod::Median);
        assert_eq!(est.method, GapMethod::Span);
        assert_eq!(est.seconds(), 127);
    }

    #[test]
    fn test_degenerate_window_rejected() {
        let timestamps = vec![None, secs(0), None];
        let window = ValidityWindow::scan(&timestamps).unwrap();
        let err = GapEstimate::estimate(&timestamps, &window, GapMethod::Median).unwrap_err();
        assert_eq!(err, StructuralError::DegenerateWindow { index: 1 });
    }

    #[test]
    fn test_non_positive_span_rejected() {
        let timestamps = vec![secs(100), secs(50)];
        let window = ValidityWindow::scan(&timestamps).unwrap();
        let err = GapEstimate::estimate(&timestamps, &window, GapMethod::Span).unwrap_err();
        assert_eq!(err, StructuralError::NonPositiveGap { gap_ms: -50_000 });
    }
}
