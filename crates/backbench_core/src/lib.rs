//! # backbench core
//!
//! Workflows that compare MySQL backup strategies on a synthetic dataset.
//!
//! This crate provides:
//! - Run configuration passed explicitly into every workflow
//! - Synthetic customer data generation
//! - Binary log position tracking for log-based backups
//! - Full, incremental and log-based backup/restore sequences
//! - CSV metrics logging
//!
//! The actual dumping, log extraction and replay are done by the MySQL
//! command-line tools. The harness only sequences them, times them and
//! samples CPU load around each restore.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use backbench_core::{BenchConfig, CommandTools, Harness, MysqlDatabase, Strategy, SystemCpuSampler};
//!
//! let config = BenchConfig::load("bench.toml".as_ref())?;
//! let db = MysqlDatabase::new(&config)?;
//! let tools = CommandTools::new(&config);
//! let cpu = SystemCpuSampler::new(config.cpu_sample_interval);
//! let mut harness = Harness::new(config, db, tools, cpu)?;
//! let summary = harness.run(Strategy::LogBased)?;
//! assert!(summary.is_consistent());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cpu;
mod database;
mod error;
pub mod metrics;
mod seeder;
mod server;
mod tools;
mod tracker;
mod types;
mod workflow;

pub use config::{BenchConfig, ConnectionConfig, ToolPaths, WorkloadConfig, MAX_INSERT_CHUNK};
pub use cpu::{CpuSampler, SystemCpuSampler};
pub use database::Database;
pub use error::{BenchError, BenchResult};
pub use seeder::{insert_batch, seed_table, RecordGenerator};
pub use server::MysqlDatabase;
pub use tools::{window_args, BackupTools, CommandTools};
pub use tracker::{Advance, PositionTracker};
pub use types::{
    round2, BackupArtifact, CustomerRecord, LogPosition, LogWindow, RestoreMeasurement, Rotation,
    RunSummary, Strategy,
};
pub use workflow::Harness;

/// Artifact file names written into the work directory.
pub mod artifacts {
    pub use crate::workflow::{
        incremental_segment_file, log_segment_file, FULL_DUMP_FILE, INCREMENTAL_BASE_FILE,
        LOG_BASED_BASE_FILE,
    };
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
