//! Exact-Duplicate Row Removal

use crate::{NormalizedRecord, RawRecord, Record, Series};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::hash::Hash;
use tracing::debug;

/// Hashable identity of a row; two rows are duplicates when their keys match
pub trait DedupKey {
    type Key: Hash + Eq;

    fn dedup_key(&self) -> Self::Key;
}

/// Float identity by bit pattern, with `-0.0` folded onto `0.0`
fn float_key(value: Option<f64>) -> Option<u64> {
    value.map(|v| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() })
}

impl DedupKey for RawRecord {
    type Key = RawRecord;

    fn dedup_key(&self) -> Self::Key {
        self.clone()
    }
}

impl DedupKey for NormalizedRecord {
    type Key = (String, String, Option<u64>, Option<u64>);

    fn dedup_key(&self) -> Self::Key {
        (
            self.date.clone(),
            self.time.clone(),
            float_key(self.temperature),
            float_key(self.humidity),
        )
    }
}

impl DedupKey for Record {
    type Key = (Option<NaiveDateTime>, Option<u64>, Option<u64>);

    fn dedup_key(&self) -> Self::Key {
        (
            self.timestamp,
            float_key(self.temperature),
            float_key(self.humidity),
        )
    }
}

/// Remove every row that exactly duplicates an earlier one
///
/// Keeps the first occurrence and the relative order of survivors. Returns the
/// number of rows removed.
pub fn dedup<T: DedupKey>(rows: &mut Vec<T>) -> usize {
    let before = rows.len();
    let mut seen = HashSet::with_capacity(before);
    rows.retain(|row| seen.insert(row.dedup_key()));

    let removed = before - rows.len();
    debug!("Dedup removed {} of {} rows", removed, before);
    removed
}

impl Series {
    /// Remove rows that exactly duplicate an earlier row
    pub fn dedup(&mut self) -> usize {
        dedup(self.records_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(temp: Option<f64>, hum: Option<f64>) -> Record {
        Record::new(None, temp, hum)
    }

    #[test]
    fn test_keeps_first_occurrence() {
        let mut rows = vec![
            row(Some(20.0), Some(40.0)),
            row(Some(21.0), Some(41.0)),
            row(Some(20.0), Some(40.0)),
            row(Some(22.0), Some(42.0)),
        ];

        let removed = dedup(&mut rows);

        assert_eq!(removed, 1);
        assert_eq!(
            rows,
            vec![
                row(Some(20.0), Some(40.0)),
                row(Some(21.0), Some(41.0)),
                row(Some(22.0), Some(42.0)),
            ]
        );
    }

    #[test]
    fn test_missing_values_compare_equal() {
        let mut rows = vec![row(None, Some(1.0)), row(None, Some(1.0))];
        assert_eq!(dedup(&mut rows), 1);
    }

    #[test]
    fn test_raw_duplicate_lines() {
        let line = RawRecord {
            date: "2021-01-01".into(),
            time: "00:00:00".into(),
            temp_raw: "T=20.0".into(),
            hum_raw: "H=40.0".into(),
            trailing: "TO".into(),
        };
        let mut rows = vec![line.clone(), line.clone(), line];
        assert_eq!(dedup(&mut rows), 2);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_same_readings_different_time_are_kept() {
        let t0 = chrono::NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut series = Series::new(vec![
            Record::new(Some(t0), Some(20.0), Some(40.0)),
            Record::new(Some(t0 + chrono::Duration::seconds(60)), Some(20.0), Some(40.0)),
        ]);
        assert_eq!(series.dedup(), 0);
        assert_eq!(series.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_dedup_idempotent(values in prop::collection::vec((0u8..4, 0u8..4), 0..40)) {
            let mut rows: Vec<Record> = values
                .iter()
                .map(|&(t, h)| row(Some(f64::from(t)), Some(f64::from(h))))
                .collect();

            dedup(&mut rows);
            let once = rows.clone();
            let removed_again = dedup(&mut rows);

            prop_assert_eq!(removed_again, 0);
            prop_assert_eq!(rows, once);
        }
    }
}
