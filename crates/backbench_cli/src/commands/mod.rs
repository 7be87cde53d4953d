//! CLI command implementations.

pub mod report;
pub mod run;

use backbench_core::{BenchConfig, BenchResult};
use std::path::{Path, PathBuf};

/// Reads the configuration file if given, then applies the work directory
/// override.
pub fn load_config(path: Option<&Path>, work_dir: Option<PathBuf>) -> BenchResult<BenchConfig> {
    let config = match path {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::new(),
    };
    Ok(match work_dir {
        Some(dir) => config.work_dir(dir),
        None => config,
    })
}
