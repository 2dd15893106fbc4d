//! Date + Time Field Merging

use chrono::NaiveDateTime;
use sensor_series::{NormalizedRecord, Record, Series};
use tracing::info;

/// Accepted layouts of `"<date> <time>"`, tried in order
pub const TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Merge a date and a time field; `None` when no layout matches
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let joined = format!("{} {}", date.trim(), time.trim());
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&joined, fmt).ok())
}

/// Build the series from normalized rows, dropping the date and time strings
pub fn build_series(rows: &[NormalizedRecord]) -> Series {
    let series: Series = rows
        .iter()
        .map(|row| Record {
            timestamp: parse_timestamp(&row.date, &row.time),
            temperature: row.temperature,
            humidity: row.humidity,
        })
        .collect();

    let unparsed = series.iter().filter(|r| r.timestamp.is_none()).count();
    info!(
        "Datetime created from date and time columns ({} of {} unparsable)",
        unparsed,
        series.len()
    );
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_iso_layout() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(10, 15, 30)
            .unwrap();
        assert_eq!(parse_timestamp("2021-03-01", "10:15:30"), Some(expected));
        assert_eq!(parse_timestamp("01.03.2021", "10:15:30"), Some(expected));
    }

    #[test]
    fn test_corrupt_fields_are_missing() {
        assert_eq!(parse_timestamp("2021-02-30", "10:00:00"), None);
        assert_eq!(parse_timestamp("2021-03-01", "25:00:00"), None);
        assert_eq!(parse_timestamp("20#1-03-01", "10:00:00"), None);
        assert_eq!(parse_timestamp("", ""), None);
    }

    #[test]
    fn test_build_series_keeps_order_and_readings() {
        let rows = vec![
            NormalizedRecord {
                date: "2021-03-01".into(),
                time: "10:00:00".into(),
                temperature: Some(20.0),
                humidity: None,
            },
            NormalizedRecord {
                date: "bad".into(),
                time: "10:01:00".into(),
                temperature: Some(21.0),
                humidity: Some(40.0),
            },
        ];

        let series = build_series(&rows);

        assert_eq!(series.len(), 2);
        assert!(series.records()[0].timestamp.is_some());
        assert!(series.records()[1].timestamp.is_none());
        assert_eq!(series.temperatures(), vec![Some(20.0), Some(21.0)]);
        assert_eq!(series.humidities(), vec![None, Some(40.0)]);
    }
}
