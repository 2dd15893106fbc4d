//! Pipeline Driver
//!
//! Runs the cleaning stages in order over one exclusively owned series:
//! normalize, dedup, build timestamps, repair, validate, interpolate,
//! treat outliers, dedup again.

use crate::config::PipelineConfig;
use crate::PipelineError;
use chrono::NaiveDateTime;
use data_validator::{
    InterpolationReport, Interpolator, NormalizationConfig, Normalizer, Rejection, Validator,
};
use outlier_engine::{OutlierEngine, OutlierReport};
use sensor_series::{dedup, RawRecord, Series};
use std::path::PathBuf;
use timestamp_repair::{build_series, RepairReport, TimestampRepairer};
use tracing::{debug, error, info, warn};

/// Per-stage outcomes of one cleaning pass
#[derive(Debug, Clone)]
pub struct StageReports {
    /// Rows with an unparsable reading after normalization
    pub missing_readings: Vec<usize>,
    /// Duplicates dropped from the normalized input
    pub duplicates_input: usize,
    pub repair: RepairReport,
    pub rejected: Vec<Rejection>,
    pub interpolation: InterpolationReport,
    pub outliers: OutlierReport,
    /// Duplicates dropped after treatment
    pub duplicates_output: usize,
}

/// Cleaned series with the snapshot taken just before outlier treatment
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub series: Series,
    pub before_outliers: Series,
    pub reports: StageReports,
}

/// What a file-to-file run produced
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub rows_loaded: usize,
    pub skipped_lines: Vec<u64>,
    pub rows_written: usize,
    pub output_path: PathBuf,
    /// Set when the diagnostics image was rendered
    pub plot_path: Option<PathBuf>,
}

/// Configured set of stages
pub struct Pipeline {
    config: PipelineConfig,
    now: NaiveDateTime,
    normalizer: Normalizer,
    repairer: TimestampRepairer,
    validator: Validator,
    interpolator: Interpolator,
    outliers: OutlierEngine,
}

impl Pipeline {
    /// Build the stages; `now` bounds every timestamp the repair accepts
    pub fn new(config: PipelineConfig, now: NaiveDateTime) -> Result<Self, PipelineError> {
        config.validate()?;

        let outliers = OutlierEngine::new(config.outlier_policy()?, config.treatment())
            .map_err(crate::ConfigError::from)?;

        Ok(Self {
            normalizer: Normalizer::new(NormalizationConfig::default()),
            repairer: TimestampRepairer::new(config.repair()),
            validator: Validator::new(config.validation.clone()),
            interpolator: Interpolator::new(config.edge_policy),
            outliers,
            config,
            now,
        })
    }

    /// Clean loaded rows; fails only when the time axis cannot be rebuilt
    pub fn clean(&self, raw: &[RawRecord]) -> Result<CleanOutcome, PipelineError> {
        let normalized = self.normalizer.normalize(raw);
        let mut rows = normalized.records;

        let duplicates_input = dedup(&mut rows);
        info!("Duplicate rows dropped from input: {}", duplicates_input);

        let mut series = build_series(&rows);
        let repair = self.repairer.repair(&mut series, self.now)?;

        let validation = self.validator.apply(&mut series);
        let interpolation = self.interpolator.apply(&mut series);

        let before_outliers = series.snapshot();
        let outliers = self.outliers.apply(&mut series);

        let duplicates_output = series.dedup();
        info!("Duplicate rows dropped after cleaning: {}", duplicates_output);

        Ok(CleanOutcome {
            series,
            before_outliers,
            reports: StageReports {
                missing_readings: normalized.missing_indices,
                duplicates_input,
                repair,
                rejected: validation.rejected,
                interpolation,
                outliers,
                duplicates_output,
            },
        })
    }

    /// Load the input, clean it, render diagnostics and write the output
    pub fn run(&self) -> Result<PipelineSummary, PipelineError> {
        let input = self
            .config
            .input_path
            .as_ref()
            .ok_or(crate::ConfigError::MissingInput)?;
        let output_path = self
            .config
            .resolved_output()
            .ok_or(crate::ConfigError::MissingInput)?;

        let loaded = sensor_io::load(input)?;
        let outcome = self.clean(&loaded.records)?;

        let plot_path = if self.config.render_plot {
            self.plot(&outcome)
        } else {
            debug!("Plot rendering skipped");
            None
        };

        sensor_io::write(&outcome.series, &output_path)?;
        info!("Output file written: {}", output_path.display());

        Ok(PipelineSummary {
            rows_loaded: loaded.records.len(),
            skipped_lines: loaded.skipped_lines,
            rows_written: outcome.series.len(),
            output_path,
            plot_path,
        })
    }

    fn plot(&self, outcome: &CleanOutcome) -> Option<PathBuf> {
        let plot = self.config.plot();
        if let Err(e) = diagnostics_plot::render(&outcome.before_outliers, &outcome.series, &plot) {
            error!("Plotting failed: {}", e);
            return None;
        }
        if plot.show {
            if let Err(e) = diagnostics_plot::show(&plot.path) {
                warn!("{:?}", e);
            }
        }
        Some(plot.path)
    }
}
