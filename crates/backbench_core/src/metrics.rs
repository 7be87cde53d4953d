//! CSV metrics logging.
//!
//! Each workflow writes one backup log and one restore log. A file holds
//! exactly one header row followed by one row per completed operation, in
//! the order the operations finished.
//!
//! Column names are part of the file format read by the report, including
//! the mixed-case `backup_size_MB` and `File Name` columns.

use crate::error::BenchResult;
use crate::types::round2;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A row type with a fixed header.
pub trait MetricsRow: Serialize {
    /// Column names, in serialization order.
    const HEADERS: &'static [&'static str];
}

/// Backup measurement for the full and incremental workflows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupRow {
    /// 0 for the initial full backup, then the batch number.
    pub batch: u32,
    /// `full` or `incremental`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Total rows in the table when the backup was taken.
    pub records_inserted: u64,
    /// Seconds spent in the backup tool.
    pub backup_time_s: f64,
    /// Artifact size in MiB.
    #[serde(rename = "backup_size_MB")]
    pub backup_size_mb: f64,
}

impl MetricsRow for BackupRow {
    const HEADERS: &'static [&'static str] = &[
        "batch",
        "type",
        "records_inserted",
        "backup_time_s",
        "backup_size_MB",
    ];
}

/// Restore measurement for the full and incremental workflows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestoreRow {
    /// `full` or `incremental`.
    pub phase: String,
    /// 0 for the full restore, then the replayed batch number.
    pub batch: u32,
    /// Seconds spent in the restore tool.
    pub restore_time_s: f64,
    /// CPU percentage before the restore.
    pub cpu_before: f64,
    /// CPU percentage after the restore.
    pub cpu_after: f64,
}

impl MetricsRow for RestoreRow {
    const HEADERS: &'static [&'static str] = &[
        "phase",
        "batch",
        "restore_time_s",
        "cpu_before",
        "cpu_after",
    ];
}

/// Backup measurement for the log-based workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogBackupRow {
    /// 0 for the initial full backup, then the batch number.
    pub batch: u32,
    /// `Full` or `Log-Based`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Artifact file name.
    #[serde(rename = "File Name")]
    pub file_name: String,
    /// Artifact size in MiB.
    #[serde(rename = "backup_size_MB")]
    pub backup_size_mb: f64,
    /// Seconds spent in the backup tool.
    pub backup_time_s: f64,
}

impl MetricsRow for LogBackupRow {
    const HEADERS: &'static [&'static str] = &[
        "batch",
        "type",
        "File Name",
        "backup_size_MB",
        "backup_time_s",
    ];
}

/// Restore measurement for the log-based workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRestoreRow {
    /// `Full Restore` or `Log-Based Restore {n}`.
    #[serde(rename = "Step")]
    pub step: String,
    /// Artifact file name.
    #[serde(rename = "File Name")]
    pub file_name: String,
    /// Seconds spent in the restore tool.
    pub restore_time_s: f64,
    /// CPU percentage before the restore.
    pub cpu_before: f64,
    /// CPU percentage after the restore.
    pub cpu_after: f64,
}

impl MetricsRow for LogRestoreRow {
    const HEADERS: &'static [&'static str] = &[
        "Step",
        "File Name",
        "restore_time_s",
        "cpu_before",
        "cpu_after",
    ];
}

/// Converts a CPU sample to the two-decimal value written to CSV.
pub fn cpu_column(sample: f32) -> f64 {
    round2(f64::from(sample))
}

/// An append-only CSV file of one row type.
#[derive(Debug)]
pub struct MetricsLog<R> {
    path: PathBuf,
    _row: PhantomData<fn(&R)>,
}

impl<R: MetricsRow> MetricsLog<R> {
    /// Opens a log for appending, writing the header only if the file does
    /// not exist yet.
    pub fn open_append(path: impl Into<PathBuf>) -> BenchResult<Self> {
        let path = path.into();
        if !path.exists() {
            write_header::<R>(File::create(&path)?)?;
        }
        Ok(Self {
            path,
            _row: PhantomData,
        })
    }

    /// Creates a log, discarding any previous contents.
    pub fn create(path: impl Into<PathBuf>) -> BenchResult<Self> {
        let path = path.into();
        write_header::<R>(File::create(&path)?)?;
        Ok(Self {
            path,
            _row: PhantomData,
        })
    }

    /// Appends one row and flushes it to disk.
    pub fn append(&mut self, row: &R) -> BenchResult<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }

    /// Path of the CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_header<R: MetricsRow>(file: File) -> BenchResult<()> {
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(R::HEADERS)?;
    writer.flush()?;
    Ok(())
}
