//! Pipeline configuration
//!
//! Layered as defaults, optional TOML file, `SENSOR_CLEAN_*` environment
//! variables, then command-line flags.

use config::{Config, Environment, File};
use data_validator::{EdgePolicy, ValidationConfig, ValidationError};
use diagnostics_plot::PlotConfig;
use outlier_engine::{OutlierError, OutlierPolicy, Treatment, DEFAULT_N_SIGMA};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use timestamp_repair::{GapMethod, RepairConfig};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SENSOR_CLEAN";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No input file given")]
    MissingInput,

    #[error("dispersion_n is only meaningful with the dispersion policy (policy is {0:?})")]
    SigmaWithoutDispersion(PolicyKind),

    #[error("Treatment {0:?} selected while outlier detection is disabled")]
    TreatmentWithoutPolicy(Treatment),

    #[error("Invalid outlier settings")]
    Outlier(#[from] OutlierError),

    #[error("Invalid validation range")]
    Range(#[from] ValidationError),

    #[error("Cannot load configuration")]
    Load(#[from] config::ConfigError),
}

/// Outlier detection policy selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Quantile,
    #[default]
    Dispersion,
    None,
}

/// Full pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input_path: Option<PathBuf>,
    /// Defaults to `<input stem>_clean.csv` next to the input
    pub output_path: Option<PathBuf>,
    /// Open the rendered plot
    pub show_plot: bool,
    /// Render the diagnostics PNG
    pub render_plot: bool,
    pub plot_path: PathBuf,
    pub outlier_policy: PolicyKind,
    /// Defaults to `remove`
    pub treatment: Option<Treatment>,
    /// Defaults to 3 under the dispersion policy
    pub dispersion_n: Option<f64>,
    pub gap_method: GapMethod,
    pub edge_policy: EdgePolicy,
    pub validation: ValidationConfig,
    pub verbose_logging: bool,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: None,
            show_plot: false,
            render_plot: true,
            plot_path: PlotConfig::default().path,
            outlier_policy: PolicyKind::default(),
            treatment: None,
            dispersion_n: None,
            gap_method: GapMethod::default(),
            edge_policy: EdgePolicy::default(),
            validation: ValidationConfig::default(),
            verbose_logging: false,
            json_logs: false,
        }
    }
}

impl PipelineConfig {
    /// Load defaults, then an optional file, then environment variables
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Check for contradictory or unusable settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_path.is_none() {
            return Err(ConfigError::MissingInput);
        }
        self.validation.check()?;
        self.outlier_policy()?.check()?;
        Ok(())
    }

    /// Detection policy resolved from the selector and `dispersion_n`
    pub fn outlier_policy(&self) -> Result<OutlierPolicy, ConfigError> {
        match (self.outlier_policy, self.dispersion_n) {
            (PolicyKind::Dispersion, n) => {
                Ok(OutlierPolicy::dispersion(n.unwrap_or(DEFAULT_N_SIGMA)))
            }
            (kind, Some(_)) => Err(ConfigError::SigmaWithoutDispersion(kind)),
            (PolicyKind::Quantile, None) => Ok(OutlierPolicy::quantile()),
            (PolicyKind::None, None) => match self.treatment {
                Some(treatment) if treatment != Treatment::default() => {
                    Err(ConfigError::TreatmentWithoutPolicy(treatment))
                }
                _ => Ok(OutlierPolicy::Disabled),
            },
        }
    }

    pub fn treatment(&self) -> Treatment {
        self.treatment.unwrap_or_default()
    }

    pub fn repair(&self) -> RepairConfig {
        RepairConfig {
            gap_method: self.gap_method,
        }
    }

    pub fn plot(&self) -> PlotConfig {
        PlotConfig {
            path: self.plot_path.clone(),
            show: self.show_plot,
            ..PlotConfig::default()
        }
    }

    /// Output path, derived from the input when not set
    pub fn resolved_output(&self) -> Option<PathBuf> {
        if let Some(path) = &self.output_path {
            return Some(path.clone());
        }
        let input = self.input_path.as_ref()?;
        let stem = input.file_stem()?.to_string_lossy();
        Some(input.with_file_name(format!("{}_clean.csv", stem)))
    }
}
