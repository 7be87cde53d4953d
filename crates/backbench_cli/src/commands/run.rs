//! Workflow commands.

use backbench_core::{
    BenchConfig, CommandTools, Harness, MysqlDatabase, RunSummary, Strategy, SystemCpuSampler,
};
use tracing::info;

/// Runs one workflow against the configured server and prints its summary.
pub fn run(
    config: BenchConfig,
    strategy: Strategy,
    json: bool,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    info!(
        "Connecting to {}:{} as {}",
        config.connection.host, config.connection.port, config.connection.user
    );
    let db = MysqlDatabase::new(&config)?;
    let tools = CommandTools::new(&config);
    let cpu = SystemCpuSampler::new(config.cpu_sample_interval);
    let work_dir = config.work_dir.clone();

    let mut harness = Harness::new(config, db, tools, cpu)?;
    let summary = harness.run(strategy)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, &work_dir.display().to_string());
    }
    Ok(summary)
}

fn print_summary(summary: &RunSummary, work_dir: &str) {
    if summary.is_lossless() {
        println!("✓ {} backup and restore completed", summary.strategy);
    } else {
        println!("✗ {} restore is incomplete", summary.strategy);
    }
    println!("  Segments: {}", summary.segments_captured);
    println!("  Rows before drop: {}", summary.rows_before_drop);
    println!("  Rows expected: {}", summary.rows_expected);
    println!("  Rows restored: {}", summary.rows_restored);
    if let Some(rotation) = &summary.rotation {
        println!(
            "  Log rotated from {} to {} during batch {}",
            rotation.from, rotation.to, rotation.batch
        );
    }
    println!(
        "  Metrics: {}/{}, {}/{}",
        work_dir,
        summary.strategy.backup_log_file(),
        work_dir,
        summary.strategy.restore_log_file()
    );
}
