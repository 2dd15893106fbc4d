//! Interactive Display via the Platform Image Opener

use crate::PlotError;
use std::path::Path;
use std::process::Command;
use tracing::info;

fn opener(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Open a rendered plot in the desktop's default viewer
pub fn show(path: &Path) -> Result<(), PlotError> {
    opener(path).spawn().map_err(|source| PlotError::Viewer {
        path: path.display().to_string(),
        source,
    })?;
    info!("Opened {} in the default viewer", path.display());
    Ok(())
}
