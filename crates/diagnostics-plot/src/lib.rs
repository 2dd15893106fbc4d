//! Diagnostic Plots
//!
//! Renders box and line plots of a series before and after outlier
//! treatment into a single PNG, and optionally opens it in a viewer.

mod render;
mod viewer;

pub use render::{render, value_range};
pub use viewer::show;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Plot rendering errors
#[derive(Debug, Error)]
pub enum PlotError {
    /// Drawing backend failed
    #[error("Render error: {0}")]
    Render(String),

    /// Image viewer could not be launched
    #[error("Cannot open viewer for {path}")]
    Viewer {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Plot output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// PNG output path
    pub path: PathBuf,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Open the image after rendering
    pub show: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("plot.png"),
            width: 1400,
            height: 700,
            show: false,
        }
    }
}
