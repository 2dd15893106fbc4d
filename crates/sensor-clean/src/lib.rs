//! Sensor Log Cleaning Pipeline
//!
//! Command-line driver that loads a temperature/humidity log, rebuilds its
//! time axis, rejects and interpolates bad readings, treats outliers and
//! writes the cleaned table together with a diagnostics plot.

pub mod cli;
pub mod config;
pub mod logging;
pub mod pipeline;

pub use cli::Cli;
pub use config::{ConfigError, PipelineConfig, PolicyKind};
pub use logging::init_logging;
pub use pipeline::{CleanOutcome, Pipeline, PipelineSummary, StageReports};

use sensor_io::IoError;
use thiserror::Error;
use timestamp_repair::StructuralError;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid configuration")]
    Config(#[from] ConfigError),

    #[error("Table I/O failed")]
    Io(#[from] IoError),

    #[error("Timestamp repair failed")]
    Structural(#[from] StructuralError),
}
