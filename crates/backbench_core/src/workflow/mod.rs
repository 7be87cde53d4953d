//! Benchmark workflows.
//!
//! A [`Harness`] owns one run's configuration and its three collaborators:
//! the database, the external tools and the CPU sampler. Each strategy is a
//! strictly linear sequence of the steps defined here:
//!
//! - `full`: seed, dump after every batch, drop, restore the last dump
//! - `incremental`: seed, dump, rotate and copy one log file per batch,
//!   drop, restore the dump then every log copy
//! - `log-based`: seed, dump, extract one position window per batch, drop,
//!   restore the dump then every window in capture order

mod full;
mod incremental;
mod log_based;

pub use full::FULL_DUMP_FILE;
pub use incremental::{incremental_segment_file, INCREMENTAL_BASE_FILE};
pub use log_based::{log_segment_file, LOG_BASED_BASE_FILE};

use crate::config::BenchConfig;
use crate::cpu::CpuSampler;
use crate::database::Database;
use crate::error::BenchResult;
use crate::seeder::{self, RecordGenerator};
use crate::tools::BackupTools;
use crate::types::{round2, BackupArtifact, LogWindow, RestoreMeasurement, RunSummary, Strategy};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Runs backup strategies against one database.
pub struct Harness<D: Database, T: BackupTools, C: CpuSampler> {
    config: BenchConfig,
    db: D,
    tools: T,
    cpu: C,
    generator: RecordGenerator,
}

impl<D: Database, T: BackupTools, C: CpuSampler> Harness<D, T, C> {
    /// Creates a harness, validating the config and creating the work
    /// directory.
    pub fn new(config: BenchConfig, db: D, tools: T, cpu: C) -> BenchResult<Self> {
        config.validate()?;
        fs::create_dir_all(&config.work_dir)?;
        let generator = RecordGenerator::from_seed(config.seed);
        Ok(Self {
            config,
            db,
            tools,
            cpu,
            generator,
        })
    }

    /// The run configuration.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// The database under test.
    pub fn database(&mut self) -> &mut D {
        &mut self.db
    }

    /// Consumes the harness, returning its collaborators.
    pub fn into_parts(self) -> (D, T, C) {
        (self.db, self.tools, self.cpu)
    }

    /// Runs one strategy.
    pub fn run(&mut self, strategy: Strategy) -> BenchResult<RunSummary> {
        info!(strategy = %strategy, "starting run");
        let summary = match strategy {
            Strategy::Full => self.run_full()?,
            Strategy::Incremental => self.run_incremental()?,
            Strategy::LogBased => self.run_log_based()?,
        };
        info!(
            strategy = %strategy,
            restored = summary.rows_restored,
            expected = summary.rows_expected,
            "run finished"
        );
        Ok(summary)
    }

    fn seed(&mut self) -> BenchResult<()> {
        let w = &self.config.workload;
        info!("Creating table and inserting {} records...", w.initial_records);
        seeder::seed_table(
            &mut self.db,
            &mut self.generator,
            w.initial_records,
            w.insert_chunk_size,
        )?;
        info!("Initial data inserted.");
        Ok(())
    }

    fn insert_batch(&mut self, batch: u32) -> BenchResult<()> {
        let w = &self.config.workload;
        info!("Inserting batch {} of {}...", batch, w.batches);
        seeder::insert_batch(
            &mut self.db,
            &mut self.generator,
            w.records_per_batch,
            w.insert_chunk_size,
        )
    }

    fn report_size(&mut self) -> BenchResult<()> {
        let bytes = self.db.size_bytes()?;
        info!(
            "Database size before full backup: {} MB",
            round2(bytes as f64 / (1024.0 * 1024.0))
        );
        Ok(())
    }

    fn full_dump(&mut self, file_name: &str) -> BenchResult<BackupArtifact> {
        let path = self.config.artifact_path(file_name);
        info!("Performing full backup...");
        let duration = timed(|| self.tools.dump(&path))?;
        let artifact = measure_artifact(&path, duration)?;
        info!(
            "Full backup completed in {}s, size: {} MB",
            artifact.duration_secs(),
            artifact.size_mb()
        );
        Ok(artifact)
    }

    fn extract(
        &mut self,
        log_file: &str,
        window: Option<&LogWindow>,
        file_name: &str,
    ) -> BenchResult<BackupArtifact> {
        let log_path = self.config.binlog_dir.join(log_file);
        let path = self.config.artifact_path(file_name);
        let duration = timed(|| self.tools.extract_log(&log_path, window, &path))?;
        measure_artifact(&path, duration)
    }

    fn reset(&mut self) -> BenchResult<()> {
        info!("Dropping and recreating database...");
        self.db.reset_schema()?;
        info!("Database reset complete.");
        Ok(())
    }

    fn restore_file(&mut self, path: &Path) -> BenchResult<RestoreMeasurement> {
        let cpu_before = self.cpu.sample();
        let duration = timed(|| self.tools.apply(path))?;
        let cpu_after = self.cpu.sample();
        let measurement = RestoreMeasurement {
            duration,
            cpu_before,
            cpu_after,
        };
        info!(
            "Applied {} in {}s",
            path.display(),
            measurement.duration_secs()
        );
        info!(
            "CPU load during restore (approx): from {}% to {}%",
            cpu_before, cpu_after
        );
        Ok(measurement)
    }

    fn verify(&mut self) -> BenchResult<u64> {
        info!("Verifying final row count...");
        let rows = self.db.row_count()?;
        info!("Recovered {} rows in '{}' table.", rows, self.config.table);
        Ok(rows)
    }
}

/// Runs `f` and returns how long it took.
fn timed<F>(f: F) -> BenchResult<Duration>
where
    F: FnOnce() -> BenchResult<()>,
{
    let start = Instant::now();
    f()?;
    Ok(start.elapsed())
}

fn measure_artifact(path: &Path, duration: Duration) -> BenchResult<BackupArtifact> {
    let size_bytes = fs::metadata(path)?.len();
    Ok(BackupArtifact {
        path: path.to_path_buf(),
        size_bytes,
        duration,
    })
}
