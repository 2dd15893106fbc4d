//! Structural Check and Backfill of Timestamps

use crate::{GapEstimate, GapMethod, StructuralError, ValidityWindow};
use chrono::{Duration, NaiveDateTime};
use sensor_series::Series;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Timestamp repair configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Gap estimation method
    pub gap_method: GapMethod,
}

/// Outcome of a repair run
#[derive(Debug, Clone)]
pub struct RepairReport {
    /// Window of the timestamps as parsed, before the structural check
    pub window: ValidityWindow,
    pub gap: GapEstimate,
    /// Rows whose parsed timestamp failed the structural check
    pub invalidated: Vec<usize>,
    /// Rows that received a synthesized timestamp, ascending
    pub repaired: Vec<usize>,
}

/// Rebuilds a monotonic time axis over a series
pub struct TimestampRepairer {
    config: RepairConfig,
}

impl TimestampRepairer {
    /// Create a new repairer
    pub fn new(config: RepairConfig) -> Self {
        Self { config }
    }

    /// Repair every missing or structurally invalid timestamp in place
    ///
    /// `now` is the upper bound a timestamp may take. On error the series is
    /// left untouched.
    pub fn repair(
        &self,
        series: &mut Series,
        now: NaiveDateTime,
    ) -> Result<RepairReport, StructuralError> {
        let mut timestamps = series.timestamps();
        let report = self.repair_timestamps(&mut timestamps, now)?;

        for (record, timestamp) in series.records_mut().iter_mut().zip(timestamps) {
            record.timestamp = timestamp;
        }
        Ok(report)
    }

    /// Repair a bare timestamp column in place
    pub fn repair_timestamps(
        &self,
        timestamps: &mut [Option<NaiveDateTime>],
        now: NaiveDateTime,
    ) -> Result<RepairReport, StructuralError> {
        let window = ValidityWindow::scan(timestamps)?;
        info!(
            "First valid timestamp: {}, index: {}",
            window.start_time, window.first_valid_index
        );
        info!(
            "Last valid timestamp: {}, index: {}",
            window.end_time, window.last_valid_index
        );

        let gap = GapEstimate::estimate(timestamps, &window, self.config.gap_method)?;
        info!(
            "Gap between timestamps: {}s ({:?})",
            gap.seconds(),
            gap.method
        );

        let mut working = timestamps.to_vec();
        let mut invalidated = structural_pass(&mut working, &window, now);
        invalidated.extend(resolve_order(&mut working));
        invalidated.sort_unstable();
        info!(
            "Invalid timestamps replaced with missing. Indices: {:?}",
            invalidated
        );

        let repaired = backfill(&mut working, gap.gap)?;
        info!(
            "Missing timestamps replaced with calculated values. Indices: {:?}",
            repaired
        );

        timestamps.copy_from_slice(&working);
        Ok(RepairReport {
            window,
            gap,
            invalidated,
            repaired,
        })
    }
}

impl Default for TimestampRepairer {
    fn default() -> Self {
        Self::new(RepairConfig::default())
    }
}

/// Mark timestamps missing that break the time axis
///
/// A present timestamp is rejected when it lies outside `[start_time, now]`,
/// is not strictly before the next row's timestamp (`now` for the last row),
/// or is not strictly after the previous row's timestamp as it stands after
/// the earlier rows were checked. A missing neighbor imposes no constraint.
fn structural_pass(
    timestamps: &mut [Option<NaiveDateTime>],
    window: &ValidityWindow,
    now: NaiveDateTime,
) -> Vec<usize> {
    let len = timestamps.len();
    let mut invalidated = Vec::new();

    for index in 0..len {
        let Some(actual) = timestamps[index] else {
            continue;
        };
        let previous = index.checked_sub(1).and_then(|i| timestamps[i]);
        let next = if index + 1 < len {
            timestamps[index + 1]
        } else {
            Some(now)
        };

        let out_of_window = actual < window.start_time || actual > now;
        let not_before_next = next.is_some_and(|next| actual >= next);
        let not_after_previous = previous.is_some_and(|prev| prev >= actual);

        if out_of_window || not_before_next || not_after_previous {
            warn!("Timestamp[{}] = {} is not valid, marking missing", index, actual);
            timestamps[index] = None;
            invalidated.push(index);
        }
    }

    invalidated
}

/// Keep the longest strictly increasing run of survivors, marking the rest
/// missing
///
/// Catches out-of-order timestamps that are separated by missing rows and so
/// escape the neighbor checks. Returns the rows it invalidated, ascending.
fn resolve_order(timestamps: &mut [Option<NaiveDateTime>]) -> Vec<usize> {
    let present: Vec<(usize, NaiveDateTime)> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.map(|t| (i, t)))
        .collect();

    // Built tail to head so that among equally long runs the earlier rows win.
    // tails[k]: position in `present` starting the best run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut parent: Vec<Option<usize>> = vec![None; present.len()];
    for (pos, &(_, t)) in present.iter().enumerate().rev() {
        let k = tails.partition_point(|&p| present[p].1 > t);
        parent[pos] = k.checked_sub(1).map(|j| tails[j]);
        if k == tails.len() {
            tails.push(pos);
        } else {
            tails[k] = pos;
        }
    }

    let mut keep = vec![false; present.len()];
    let mut cursor = tails.last().copied();
    while let Some(pos) = cursor {
        keep[pos] = true;
        cursor = parent[pos];
    }

    let mut invalidated = Vec::new();
    for (&(index, t), kept) in present.iter().zip(keep) {
        if !kept {
            warn!("Timestamp[{}] = {} is out of order, marking missing", index, t);
            timestamps[index] = None;
            invalidated.push(index);
        }
    }
    invalidated
}

/// Synthesize every missing timestamp from its neighbors and the gap
///
/// Rows after the last present timestamp are extended forward from it and
/// leading rows step back from the first present one. Interior runs are
/// rewritten tail to head from their brackets, or spread evenly between the
/// brackets when the gap does not fit.
fn backfill(
    timestamps: &mut [Option<NaiveDateTime>],
    gap: Duration,
) -> Result<Vec<usize>, StructuralError> {
    let present: Vec<usize> = timestamps
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_some())
        .map(|(i, _)| i)
        .collect();
    let (Some(&first_present), Some(&last_present)) = (present.first(), present.last()) else {
        return Err(StructuralError::NoAnchor);
    };

    let missing: Vec<usize> = timestamps
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_none())
        .map(|(i, _)| i)
        .collect();

    for index in last_present + 1..timestamps.len() {
        let repaired = shift(timestamps[index - 1], gap, index)?;
        debug!("Calculated timestamp[{}] = {}", index, repaired);
        timestamps[index] = Some(repaired);
    }

    for pair in present.windows(2).rev() {
        if pair[1] - pair[0] > 1 {
            fill_interior(timestamps, pair[0], pair[1], gap)?;
        }
    }

    for index in (0..first_present).rev() {
        let repaired = shift(timestamps[index + 1], -gap, index)?;
        debug!("Calculated timestamp[{}] = {}", index, repaired);
        timestamps[index] = Some(repaired);
    }

    Ok(missing)
}

/// Fill the missing rows strictly between present rows `left` and `right`
fn fill_interior(
    timestamps: &mut [Option<NaiveDateTime>],
    left: usize,
    right: usize,
    gap: Duration,
) -> Result<(), StructuralError> {
    let (Some(start), Some(end)) = (timestamps[left], timestamps[right]) else {
        return Err(StructuralError::NoAnchor);
    };
    let run = right - left - 1;
    let fits = i32::try_from(run)
        .ok()
        .and_then(|run| gap.checked_mul(run))
        .is_some_and(|needed| end - start > needed);

    if fits {
        for index in (left + 1..right).rev() {
            let repaired = if index == left + 1 {
                shift(timestamps[left], gap, index)?
            } else {
                shift(timestamps[index + 1], -gap, index)?
            };
            debug!("Calculated timestamp[{}] = {}", index, repaired);
            timestamps[index] = Some(repaired);
        }
        return Ok(());
    }

    debug!(
        "Gap of {}s does not fit rows {}..{}, spreading evenly",
        gap.num_seconds(),
        left + 1,
        right
    );
    let span_ms = i128::from((end - start).num_milliseconds());
    let steps = (right - left) as i128;
    for index in left + 1..right {
        let offset = span_ms * (index - left) as i128 / steps;
        let offset = i64::try_from(offset).map_err(|_| StructuralError::Overflow { index })?;
        let repaired = shift(Some(start), Duration::milliseconds(offset), index)?;
        debug!("Calculated timestamp[{}] = {}", index, repaired);
        timestamps[index] = Some(repaired);
    }
    Ok(())
}

fn shift(
    anchor: Option<NaiveDateTime>,
    by: Duration,
    index: usize,
) -> Result<NaiveDateTime, StructuralError> {
    anchor
        .ok_or(StructuralError::NoAnchor)?
        .checked_add_signed(by)
        .ok_or(StructuralError::Overflow { index })
}
