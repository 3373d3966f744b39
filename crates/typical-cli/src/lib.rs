//! Library interface for the `typical` command line tool

pub mod check;
pub mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use typical_core::config::CONFIG_FILE_NAME;
use typical_core::AnalysisConfig;

pub use check::{run_check, CheckReport};

/// Load the analysis configuration.
///
/// An explicit path must exist. Otherwise `typical.toml` in `dir` is used
/// when present, and defaults apply when it is not.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<AnalysisConfig> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if !candidate.is_file() {
                debug!("no {} found, using defaults", CONFIG_FILE_NAME);
                return Ok(AnalysisConfig::default());
            }
            candidate
        }
    };

    debug!(path = %path.display(), "loading configuration");
    AnalysisConfig::from_file(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}
