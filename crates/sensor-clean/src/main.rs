//! Sensor Log Cleaner - Main Entry Point

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use sensor_clean::{init_logging, Cli, Pipeline, PipelineConfig};
use std::process::ExitCode;
use tracing::{error, info};

const INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = PipelineConfig::load(cli.config.as_deref()).map(|mut config| {
        cli.apply(&mut config);
        config
    });

    let (verbose, json) = match &config {
        Ok(config) => (config.verbose_logging, config.json_logs),
        Err(_) => (cli.verbose, cli.json_logs),
    };
    if let Err(e) = init_logging(verbose, json) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    info!("=== Sensor Log Cleaner v{} ===", env!("CARGO_PKG_VERSION"));
    info!("STARTED");

    let code = match config.context("Loading configuration").and_then(run) {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::FAILURE
        }
    };

    info!("STOPPED");
    code
}

fn run(config: PipelineConfig) -> anyhow::Result<ExitCode> {
    let pipeline = Pipeline::new(config, Local::now().naive_local())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Starting runtime")?;

    let outcome = runtime.block_on(async move {
        let task = tokio::task::spawn_blocking(move || pipeline.run());
        tokio::select! {
            joined = task => Some(joined),
            _ = tokio::signal::ctrl_c() => None,
        }
    });
    // The blocking task may still be running after an interrupt
    runtime.shutdown_background();

    let Some(joined) = outcome else {
        info!("Keyboard interrupt");
        return Ok(ExitCode::from(INTERRUPTED));
    };

    let summary = joined.context("Pipeline task panicked")??;
    info!(
        "Cleaned {} of {} rows into {}",
        summary.rows_written,
        summary.rows_loaded,
        summary.output_path.display()
    );
    if let Some(plot) = &summary.plot_path {
        info!("Diagnostics plot: {}", plot.display());
    }
    Ok(ExitCode::SUCCESS)
}
