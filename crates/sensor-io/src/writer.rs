//! Cleaned Table Writer

use crate::IoError;
use csv::WriterBuilder;
use sensor_series::Series;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Timestamp rendering in the output table
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HEADER: [&str; 3] = ["Datetime", "Temp", "Hum"];

/// Write the series as a comma-delimited table to a file
pub fn write(series: &Series, path: impl AsRef<Path>) -> Result<(), IoError> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|source| IoError::Write {
            path: name.clone(),
            source,
        })?;

    write_rows(writer, series, &name)?;
    info!("Output file processed: {} ({} rows)", name, series.len());
    Ok(())
}

/// Write the series as a comma-delimited table to any writer
pub fn write_to_writer<W: Write>(series: &Series, writer: W) -> Result<(), IoError> {
    write_rows(WriterBuilder::new().from_writer(writer), series, "<writer>")
}

fn write_rows<W: Write>(mut writer: csv::Writer<W>, series: &Series, name: &str) -> Result<(), IoError> {
    let wrap = |source: csv::Error| IoError::Write {
        path: name.to_string(),
        source,
    };

    writer.write_record(HEADER).map_err(wrap)?;

    for record in series {
        let timestamp = record
            .timestamp
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default();
        let temperature = format_value(record.temperature);
        let humidity = format_value(record.humidity);

        writer
            .write_record([timestamp, temperature, humidity])
            .map_err(wrap)?;
    }

    writer.flush().map_err(|source| IoError::Flush {
        path: name.to_string(),
        source,
    })
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
