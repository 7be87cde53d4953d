//! Position-window binary log strategy.

use super::Harness;
use crate::cpu::CpuSampler;
use crate::database::Database;
use crate::error::BenchResult;
use crate::metrics::{cpu_column, LogBackupRow, LogRestoreRow, MetricsLog};
use crate::tools::BackupTools;
use crate::tracker::{Advance, PositionTracker};
use crate::types::{Rotation, RunSummary, Strategy};
use tracing::{info, warn};

/// Dump taken after seeding.
pub const LOG_BASED_BASE_FILE: &str = "full_backup.sql";

/// Name of the log excerpt for one batch.
pub fn log_segment_file(batch: u32) -> String {
    format!("logbackup_batch{batch}.sql")
}

impl<D: Database, T: BackupTools, C: CpuSampler> Harness<D, T, C> {
    /// Extracts one position window per batch from a single binary log file.
    ///
    /// If the server rotates to a new file during a batch, the loop stops
    /// before extracting anything for that batch and the restore replays
    /// only the windows captured so far.
    pub fn run_log_based(&mut self) -> BenchResult<RunSummary> {
        let workload = self.config.workload.clone();
        let mut backups =
            MetricsLog::<LogBackupRow>::create(self.config.backup_log_path(Strategy::LogBased))?;
        let mut restores =
            MetricsLog::<LogRestoreRow>::create(self.config.restore_log_path(Strategy::LogBased))?;

        self.seed()?;
        self.report_size()?;

        let base = self.full_dump(LOG_BASED_BASE_FILE)?;
        backups.append(&LogBackupRow {
            batch: 0,
            kind: "Full".into(),
            file_name: base.file_name(),
            backup_size_mb: base.size_mb(),
            backup_time_s: base.duration_secs(),
        })?;

        let mut tracker = PositionTracker::start(&mut self.db)?;
        let mut total = workload.initial_records;
        let mut expected = total;
        let mut rotation = None;
        let mut segments = Vec::with_capacity(workload.batches as usize);

        for batch in 1..=workload.batches {
            self.insert_batch(batch)?;
            total += workload.records_per_batch;

            let end = self.db.log_position()?;
            let window = match tracker.advance(end)? {
                Advance::Window(window) => window,
                Advance::Rotated { from, to } => {
                    warn!(
                        "Binlog file rotated from {} to {}; stopping after {} segments",
                        from,
                        to,
                        segments.len()
                    );
                    rotation = Some(Rotation { from, to, batch });
                    break;
                }
            };

            info!(
                "Extracting log-based incremental backup from position {} to {}...",
                window.start, window.stop
            );
            let segment = self.extract(&window.file, Some(&window), &log_segment_file(batch))?;
            info!(
                "Log-based backup {} saved: {} (Time: {}s, Size: {} MB)",
                batch,
                segment.file_name(),
                segment.duration_secs(),
                segment.size_mb()
            );
            backups.append(&LogBackupRow {
                batch,
                kind: "Log-Based".into(),
                file_name: segment.file_name(),
                backup_size_mb: segment.size_mb(),
                backup_time_s: segment.duration_secs(),
            })?;
            segments.push(segment);
            expected = total;
        }

        let rows_before_drop = self.db.row_count()?;
        self.reset()?;

        info!("Restoring full backup...");
        let restore = self.restore_file(&base.path)?;
        restores.append(&LogRestoreRow {
            step: "Full Restore".into(),
            file_name: base.file_name(),
            restore_time_s: restore.duration_secs(),
            cpu_before: cpu_column(restore.cpu_before),
            cpu_after: cpu_column(restore.cpu_after),
        })?;

        for (index, segment) in (1u32..).zip(&segments) {
            info!(
                "Applying log-based incremental backup {} ({})...",
                index,
                segment.file_name()
            );
            let restore = self.restore_file(&segment.path)?;
            restores.append(&LogRestoreRow {
                step: format!("Log-Based Restore {index}"),
                file_name: segment.file_name(),
                restore_time_s: restore.duration_secs(),
                cpu_before: cpu_column(restore.cpu_before),
                cpu_after: cpu_column(restore.cpu_after),
            })?;
        }

        let rows_restored = self.verify()?;
        if rotation.is_some() && rows_restored < rows_before_drop {
            warn!(
                "Restore is incomplete: {} of {} rows recovered",
                rows_restored, rows_before_drop
            );
        }
        Ok(RunSummary {
            strategy: Strategy::LogBased,
            segments_captured: tracker.segments(),
            rows_before_drop,
            rows_expected: expected,
            rows_restored,
            rotation,
        })
    }
}
