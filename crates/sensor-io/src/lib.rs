//! Sensor Log I/O
//!
//! Loads the space-delimited sensor log and writes the cleaned `Datetime,Temp,Hum`
//! table.

mod loader;
mod writer;

pub use loader::{load, load_from_reader, LoadReport, FIELD_COUNT};
pub use writer::{write, write_to_writer, TIMESTAMP_FORMAT};

use thiserror::Error;

/// Table I/O errors
#[derive(Debug, Error)]
pub enum IoError {
    /// Input file could not be opened or read
    #[error("Cannot open input file {path}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// First line does not carry all positional fields
    #[error("First line has {found} fields, expected {expected}")]
    MalformedHeader { found: usize, expected: usize },

    /// Input contained no lines
    #[error("Input contains no rows")]
    Empty,

    /// Output file could not be created or written
    #[error("Cannot write output file {path}")]
    Write {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Output could not be flushed
    #[error("Cannot flush output {path}")]
    Flush {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
