//! Rotate-and-copy binary log strategy.

use super::Harness;
use crate::cpu::CpuSampler;
use crate::database::Database;
use crate::error::BenchResult;
use crate::metrics::{cpu_column, BackupRow, MetricsLog, RestoreRow};
use crate::tools::BackupTools;
use crate::types::{RunSummary, Strategy};
use tracing::info;

/// Dump taken after seeding.
pub const INCREMENTAL_BASE_FILE: &str = "full_backup.sql";

/// Name of the log copy for one batch.
pub fn incremental_segment_file(batch: u32) -> String {
    format!("binlog_batch{batch}.sql")
}

impl<D: Database, T: BackupTools, C: CpuSampler> Harness<D, T, C> {
    /// Rotates the binary log before every batch and copies the whole new
    /// file afterwards, so each copy holds exactly one batch.
    pub fn run_incremental(&mut self) -> BenchResult<RunSummary> {
        let workload = self.config.workload.clone();
        let mut backups = MetricsLog::<BackupRow>::open_append(
            self.config.backup_log_path(Strategy::Incremental),
        )?;
        let mut restores = MetricsLog::<RestoreRow>::open_append(
            self.config.restore_log_path(Strategy::Incremental),
        )?;

        self.seed()?;

        let base = self.full_dump(INCREMENTAL_BASE_FILE)?;
        let mut total = workload.initial_records;
        backups.append(&BackupRow {
            batch: 0,
            kind: "full".into(),
            records_inserted: total,
            backup_time_s: base.duration_secs(),
            backup_size_mb: base.size_mb(),
        })?;

        let mut segments = Vec::with_capacity(workload.batches as usize);
        for batch in 1..=workload.batches {
            info!("Flushing logs before batch {}...", batch);
            self.db.flush_logs()?;
            let position = self.db.log_position()?;

            self.insert_batch(batch)?;

            info!("Creating incremental backup from {}...", position.file);
            let segment =
                self.extract(&position.file, None, &incremental_segment_file(batch))?;
            info!(
                "Incremental backup {} saved: {} (Time: {}s, Size: {} MB)",
                batch,
                segment.file_name(),
                segment.duration_secs(),
                segment.size_mb()
            );

            total += workload.records_per_batch;
            backups.append(&BackupRow {
                batch,
                kind: "incremental".into(),
                records_inserted: total,
                backup_time_s: segment.duration_secs(),
                backup_size_mb: segment.size_mb(),
            })?;
            segments.push(segment);
        }

        let rows_before_drop = self.db.row_count()?;
        self.reset()?;

        info!("Restoring full backup...");
        let restore = self.restore_file(&base.path)?;
        restores.append(&RestoreRow {
            phase: "full".into(),
            batch: 0,
            restore_time_s: restore.duration_secs(),
            cpu_before: cpu_column(restore.cpu_before),
            cpu_after: cpu_column(restore.cpu_after),
        })?;

        for (batch, segment) in (1u32..).zip(&segments) {
            info!("Applying incremental backup {}...", batch);
            let restore = self.restore_file(&segment.path)?;
            restores.append(&RestoreRow {
                phase: "incremental".into(),
                batch,
                restore_time_s: restore.duration_secs(),
                cpu_before: cpu_column(restore.cpu_before),
                cpu_after: cpu_column(restore.cpu_after),
            })?;
        }

        let rows_restored = self.verify()?;
        Ok(RunSummary {
            strategy: Strategy::Incremental,
            segments_captured: segments.len() as u32,
            rows_before_drop,
            rows_expected: total,
            rows_restored,
            rotation: None,
        })
    }
}
