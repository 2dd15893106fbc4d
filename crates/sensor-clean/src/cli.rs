//! Command-line arguments

use crate::config::{PipelineConfig, PolicyKind};
use clap::{ArgGroup, Parser, ValueEnum};
use data_validator::EdgePolicy;
use outlier_engine::Treatment;
use std::path::PathBuf;
use timestamp_repair::GapMethod;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TreatmentArg {
    Remove,
    Mean,
    Median,
    Mode,
    Limit,
}

impl From<TreatmentArg> for Treatment {
    fn from(v: TreatmentArg) -> Self {
        match v {
            TreatmentArg::Remove => Treatment::Remove,
            TreatmentArg::Mean => Treatment::Mean,
            TreatmentArg::Median => Treatment::Median,
            TreatmentArg::Mode => Treatment::Mode,
            TreatmentArg::Limit => Treatment::Limit,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GapMethodArg {
    Median,
    Span,
}

impl From<GapMethodArg> for GapMethod {
    fn from(v: GapMethodArg) -> Self {
        match v {
            GapMethodArg::Median => GapMethod::Median,
            GapMethodArg::Span => GapMethod::Span,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EdgeArg {
    Hold,
    Leave,
}

impl From<EdgeArg> for EdgePolicy {
    fn from(v: EdgeArg) -> Self {
        match v {
            EdgeArg::Hold => EdgePolicy::Hold,
            EdgeArg::Leave => EdgePolicy::Leave,
        }
    }
}

/// Repair timestamps and clean outliers in a temperature/humidity sensor log
#[derive(Debug, Parser)]
#[command(name = "sensor-clean", version, about)]
#[command(group(ArgGroup::new("outliers").args(["iqr", "std", "no_outliers"])))]
pub struct Cli {
    /// Space-delimited sensor log
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Cleaned CSV (default: <input>_clean.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Open the diagnostics plot after rendering
    #[arg(long, default_value_t = false)]
    pub plot: bool,

    /// Diagnostics PNG path
    #[arg(long = "plot-file")]
    pub plot_file: Option<PathBuf>,

    /// Skip rendering the diagnostics PNG
    #[arg(long = "no-plot-file", default_value_t = false, conflicts_with_all = ["plot", "plot_file"])]
    pub no_plot_file: bool,

    /// Detect outliers outside the interquartile fences
    #[arg(long, default_value_t = false)]
    pub iqr: bool,

    /// Detect outliers beyond N standard deviations of the mean
    #[arg(long, value_name = "N")]
    pub std: Option<f64>,

    /// Skip outlier detection
    #[arg(long = "no-outliers", default_value_t = false)]
    pub no_outliers: bool,

    /// Treatment of detected outliers
    #[arg(long, value_enum)]
    pub treatment: Option<TreatmentArg>,

    /// Gap estimation used to synthesize timestamps
    #[arg(long = "gap-method", value_enum)]
    pub gap_method: Option<GapMethodArg>,

    /// Missing readings at the series edges
    #[arg(long, value_enum)]
    pub edge: Option<EdgeArg>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// JSON log lines
    #[arg(long = "json-logs", default_value_t = false)]
    pub json_logs: bool,
}

impl Cli {
    /// Overlay the flags that were given onto a loaded configuration
    ///
    /// A policy flag replaces the whole policy selection, so a sigma inherited
    /// from the file or environment does not leak into `--iqr`.
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(input) = &self.input {
            config.input_path = Some(input.clone());
        }
        if let Some(output) = &self.output {
            config.output_path = Some(output.clone());
        }
        if self.plot {
            config.show_plot = true;
        }
        if let Some(path) = &self.plot_file {
            config.plot_path = path.clone();
        }
        if self.no_plot_file {
            config.render_plot = false;
            config.show_plot = false;
        }

        if self.iqr {
            config.outlier_policy = PolicyKind::Quantile;
            config.dispersion_n = None;
        } else if let Some(n) = self.std {
            config.outlier_policy = PolicyKind::Dispersion;
            config.dispersion_n = Some(n);
        } else if self.no_outliers {
            config.outlier_policy = PolicyKind::None;
            config.dispersion_n = None;
            config.treatment = None;
        }

        if let Some(treatment) = self.treatment {
            config.treatment = Some(treatment.into());
        }
        if let Some(method) = self.gap_method {
            config.gap_method = method.into();
        }
        if let Some(edge) = self.edge {
            config.edge_policy = edge.into();
        }
        if self.verbose {
            config.verbose_logging = true;
        }
        if self.json_logs {
            config.json_logs = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sensor-clean").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_policy_flags_are_exclusive() {
        let result = Cli::try_parse_from(["sensor-clean", "-i", "a.txt", "--iqr", "--std", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_iqr_clears_inherited_sigma() {
        let mut config = PipelineConfig {
            dispersion_n: Some(2.5),
            ..Default::default()
        };
        parse(&["-i", "log.txt", "--iqr", "--treatment", "limit"]).apply(&mut config);

        assert_eq!(config.outlier_policy, PolicyKind::Quantile);
        assert_eq!(config.dispersion_n, None);
        assert_eq!(config.treatment, Some(Treatment::Limit));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_std_sets_dispersion() {
        let mut config = PipelineConfig::default();
        parse(&["-i", "log.txt", "--std", "2"]).apply(&mut config);

        assert_eq!(config.outlier_policy, PolicyKind::Dispersion);
        assert_eq!(config.dispersion_n, Some(2.0));
    }

    #[test]
    fn test_no_outliers_with_treatment_is_rejected_by_validation() {
        let mut config = PipelineConfig::default();
        parse(&["-i", "log.txt", "--no-outliers", "--treatment", "mean"]).apply(&mut config);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flags_left_unset_keep_config() {
        let mut config = PipelineConfig {
            gap_method: GapMethod::Span,
            edge_policy: EdgePolicy::Hold,
            ..Default::default()
        };
        parse(&["-i", "log.txt"]).apply(&mut config);

        assert_eq!(config.gap_method, GapMethod::Span);
        assert_eq!(config.edge_policy, EdgePolicy::Hold);
        assert!(config.render_plot);
    }

    #[test]
    fn test_no_plot_file_disables_rendering() {
        let mut config = PipelineConfig::default();
        parse(&["-i", "log.txt", "--no-plot-file"]).apply(&mut config);

        assert!(!config.render_plot);
        assert!(!config.show_plot);
    }
}
