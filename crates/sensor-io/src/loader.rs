//! Space-Delimited Log Loader

use crate::IoError;
use csv::{ReaderBuilder, StringRecord};
use sensor_series::RawRecord;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Positional fields per line: date, time, temperature, humidity, trailing token
pub const FIELD_COUNT: usize = 5;

/// Result of loading a log
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Well-formed lines, in file order
    pub records: Vec<RawRecord>,
    /// 1-based line numbers that were skipped as malformed
    pub skipped_lines: Vec<u64>,
}

/// Load a sensor log from a file
pub fn load(path: impl AsRef<Path>) -> Result<LoadReport, IoError> {
    let path = path.as_ref();
    let reader = builder().from_path(path).map_err(|source| IoError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let report = read_records(reader, &path.display().to_string())?;
    info!(
        "Input file processed: {} ({} rows, {} skipped)",
        path.display(),
        report.records.len(),
        report.skipped_lines.len()
    );
    Ok(report)
}

/// Load a sensor log from any reader
pub fn load_from_reader<R: Read>(reader: R) -> Result<LoadReport, IoError> {
    read_records(builder().from_reader(reader), "<reader>")
}

fn builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .quoting(false);
    builder
}

fn read_records<R: Read>(mut reader: csv::Reader<R>, source_name: &str) -> Result<LoadReport, IoError> {
    let mut report = LoadReport::default();
    let mut first = true;

    for (ordinal, result) in reader.records().enumerate() {
        let fallback_line = ordinal as u64 + 1;

        let record = match result {
            Ok(record) => record,
            Err(err) if first => {
                return Err(IoError::Read {
                    path: source_name.to_string(),
                    source: err,
                });
            }
            Err(err) => {
                let line = err
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(fallback_line);
                warn!("Skipping unreadable line {}: {}", line, err);
                report.skipped_lines.push(line);
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);

        match to_raw(&record) {
            Some(raw) => report.records.push(raw),
            None if first => {
                return Err(IoError::MalformedHeader {
                    found: record.len(),
                    expected: FIELD_COUNT,
                });
            }
            None => {
                warn!(
                    "Skipping line {}: {} fields, expected {}",
                    line,
                    record.len(),
                    FIELD_COUNT
                );
                report.skipped_lines.push(line);
            }
        }
        first = false;
    }

    if first {
        return Err(IoError::Empty);
    }

    Ok(report)
}

fn to_raw(record: &StringRecord) -> Option<RawRecord> {
    if record.len() != FIELD_COUNT {
        return None;
    }
    Some(RawRecord {
        date: record[0].to_string(),
        time: record[1].to_string(),
        temp_raw: record[2].to_string(),
        hum_raw: record[3].to_string(),
        trailing: record[4].to_string(),
    })
}
