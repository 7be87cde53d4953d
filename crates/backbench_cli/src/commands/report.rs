//! Report command.

use backbench_report::{load_all, render_all, ChartFormat};
use std::path::Path;
use tracing::info;

/// Prints every metrics table found in `dir` and renders the charts into
/// `output`.
pub fn run(dir: &Path, output: &Path, format: ChartFormat) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading metrics from {:?}", dir);
    let data = load_all(dir)?;

    for metrics in data.strategies() {
        println!("\n=== {} Backup Data ===", metrics.strategy);
        print!("{}", metrics.backup);
        println!("\n=== {} Restore Data ===", metrics.strategy);
        print!("{}", metrics.restore);
    }
    println!();

    for path in render_all(&data, output, format)? {
        println!("✓ Plot saved: {}", path.display());
    }
    Ok(())
}
