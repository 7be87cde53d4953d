//! Test fixtures.
//!
//! A [`TestWorkspace`] owns a temporary work directory and a small
//! configuration pointing at it, and builds harnesses wired to a
//! [`FakeServer`].

use backbench_core::{BenchConfig, BenchResult, Harness, Strategy};
use csv::StringRecord;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use crate::cpu::ScriptedCpuSampler;
use crate::server::FakeServer;
use crate::tools::FakeTools;

/// A harness wired to in-memory collaborators.
pub type FakeHarness = Harness<FakeServer, FakeTools, ScriptedCpuSampler>;

/// A temporary work directory with a matching configuration.
///
/// The directory is deleted when the workspace is dropped.
pub struct TestWorkspace {
    _temp_dir: TempDir,
    config: BenchConfig,
}

impl TestWorkspace {
    /// Creates a workspace with a small default workload: 100 seed rows and
    /// five batches of 10.
    pub fn new() -> Self {
        Self::with_config(
            BenchConfig::new()
                .initial_records(100)
                .batches(5)
                .records_per_batch(10)
                .insert_chunk_size(25),
        )
    }

    /// Creates a workspace around `config`, redirecting its directories into
    /// the temporary directory.
    pub fn with_config(config: BenchConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = config
            .work_dir(temp_dir.path().join("work"))
            .binlog_dir(temp_dir.path().join("binlog"))
            .cpu_sample_interval(Duration::ZERO)
            .seed(42);
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// The workspace configuration.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Replaces the configuration, keeping the workspace directories.
    pub fn configure(&mut self, f: impl FnOnce(BenchConfig) -> BenchConfig) {
        let work_dir = self.config.work_dir.clone();
        let binlog_dir = self.config.binlog_dir.clone();
        self.config = f(self.config.clone())
            .work_dir(work_dir)
            .binlog_dir(binlog_dir);
    }

    /// The directory receiving artifacts and metrics.
    pub fn work_dir(&self) -> &Path {
        &self.config.work_dir
    }

    /// Path of a file inside the work directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.config.artifact_path(name)
    }

    /// Builds a harness over `server` with a default CPU script.
    pub fn harness(&self, server: &FakeServer) -> BenchResult<FakeHarness> {
        self.harness_with_cpu(server, ScriptedCpuSampler::default())
    }

    /// Builds a harness over `server` with the given CPU sampler.
    pub fn harness_with_cpu(
        &self,
        server: &FakeServer,
        cpu: ScriptedCpuSampler,
    ) -> BenchResult<FakeHarness> {
        Harness::new(self.config.clone(), server.clone(), server.tools(), cpu)
    }

    /// Reads a metrics file, returning its header and data rows.
    pub fn read_csv(&self, name: &str) -> (StringRecord, Vec<StringRecord>) {
        let mut reader = csv::Reader::from_path(self.path(name)).expect("Failed to open CSV");
        let headers = reader.headers().expect("Failed to read header").clone();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .expect("Failed to read rows");
        (headers, rows)
    }

    /// Reads the backup metrics written for `strategy`.
    pub fn backup_rows(&self, strategy: Strategy) -> Vec<StringRecord> {
        self.read_csv(strategy.backup_log_file()).1
    }

    /// Reads the restore metrics written for `strategy`.
    pub fn restore_rows(&self, strategy: Strategy) -> Vec<StringRecord> {
        self.read_csv(strategy.restore_log_file()).1
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `f` with a fresh workspace and server.
pub fn with_workspace<F, R>(f: F) -> R
where
    F: FnOnce(&TestWorkspace, &FakeServer) -> R,
{
    let workspace = TestWorkspace::new();
    let server = FakeServer::new();
    f(&workspace, &server)
}
