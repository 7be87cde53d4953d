//! Core value types shared by the workflows and the report.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Rounds to two decimal places, the precision used in every metrics file.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A backup strategy under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Strategy {
    /// A complete logical dump per measurement.
    Full,
    /// Whole binary log files, rotated before each batch.
    Incremental,
    /// Binary log excerpts bounded by tracked positions.
    LogBased,
}

impl Strategy {
    /// All strategies, in report order.
    pub const ALL: [Strategy; 3] = [Strategy::Full, Strategy::Incremental, Strategy::LogBased];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Full => "Full",
            Strategy::Incremental => "Incremental",
            Strategy::LogBased => "Log-Based",
        }
    }

    /// File name of the backup metrics CSV.
    pub fn backup_log_file(self) -> &'static str {
        match self {
            Strategy::Full => "full_backup_log.csv",
            Strategy::Incremental => "incremental_backup_log.csv",
            Strategy::LogBased => "log_based_backup_log.csv",
        }
    }

    /// File name of the restore metrics CSV.
    pub fn restore_log_file(self) -> &'static str {
        match self {
            Strategy::Full => "full_restore_log.csv",
            Strategy::Incremental => "incremental_restore_log.csv",
            Strategy::LogBased => "log_based_restore_log.csv",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "full" => Ok(Strategy::Full),
            "incremental" => Ok(Strategy::Incremental),
            "log-based" | "logbased" | "log" => Ok(Strategy::LogBased),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

/// One synthetic customer row. The surrogate key is assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRecord {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Single-line postal address.
    pub address: String,
}

/// A point in the server's binary log.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogPosition {
    /// Log file name, relative to the binlog directory.
    pub file: String,
    /// Byte offset within `file`.
    pub offset: u64,
}

impl LogPosition {
    /// Creates a position.
    pub fn new(file: impl Into<String>, offset: u64) -> Self {
        Self {
            file: file.into(),
            offset,
        }
    }
}

impl fmt::Display for LogPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.offset)
    }
}

/// A contiguous byte range of one binary log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogWindow {
    /// Log file name.
    pub file: String,
    /// First byte of the window.
    pub start: u64,
    /// First byte past the window.
    pub stop: u64,
}

impl LogWindow {
    /// Number of log bytes covered.
    pub fn len(&self) -> u64 {
        self.stop - self.start
    }

    /// Returns true if the window covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.stop == self.start
    }
}

/// A file produced by a backup step.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupArtifact {
    /// Where the artifact was written.
    pub path: PathBuf,
    /// Size on disk.
    pub size_bytes: u64,
    /// Wall-clock time the producing tool took.
    pub duration: Duration,
}

impl BackupArtifact {
    /// File name without the directory.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Size in MiB, rounded to two decimals.
    pub fn size_mb(&self) -> f64 {
        round2(self.size_bytes as f64 / BYTES_PER_MB)
    }

    /// Duration in seconds, rounded to two decimals.
    pub fn duration_secs(&self) -> f64 {
        round2(self.duration.as_secs_f64())
    }
}

/// Timing and CPU samples around one restore step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestoreMeasurement {
    /// Wall-clock time of the restore tool.
    pub duration: Duration,
    /// System CPU percentage sampled just before the restore.
    pub cpu_before: f32,
    /// System CPU percentage sampled just after the restore.
    pub cpu_after: f32,
}

impl RestoreMeasurement {
    /// Duration in seconds, rounded to two decimals.
    pub fn duration_secs(&self) -> f64 {
        round2(self.duration.as_secs_f64())
    }
}

/// A log rotation that ended the batch loop early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rotation {
    /// File the loop was tracking.
    pub from: String,
    /// File the server switched to.
    pub to: String,
    /// Batch whose insert crossed the rotation.
    pub batch: u32,
}

/// Outcome of one workflow run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Strategy that was exercised.
    pub strategy: Strategy,
    /// Batches whose backup artifact was captured.
    pub segments_captured: u32,
    /// Rows in the table right before the schema was dropped.
    pub rows_before_drop: u64,
    /// Rows the captured artifacts should reproduce.
    pub rows_expected: u64,
    /// Rows counted after the restore.
    pub rows_restored: u64,
    /// Set when a log rotation stopped the batch loop.
    pub rotation: Option<Rotation>,
}

impl RunSummary {
    /// Returns true if the restore reproduced what the artifacts covered.
    pub fn is_consistent(&self) -> bool {
        self.rows_restored == self.rows_expected
    }

    /// Returns true if nothing inserted before the drop was lost.
    pub fn is_lossless(&self) -> bool {
        self.rows_restored == self.rows_before_drop
    }
}
