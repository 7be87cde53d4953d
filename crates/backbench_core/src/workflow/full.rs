//! Full-dump strategy.

use super::Harness;
use crate::cpu::CpuSampler;
use crate::database::Database;
use crate::error::BenchResult;
use crate::metrics::{cpu_column, BackupRow, MetricsLog, RestoreRow};
use crate::tools::BackupTools;
use crate::types::{RunSummary, Strategy};
use tracing::info;

/// Dump file, overwritten by every batch.
pub const FULL_DUMP_FILE: &str = "backup.sql";

impl<D: Database, T: BackupTools, C: CpuSampler> Harness<D, T, C> {
    /// Takes a complete dump after seeding and after every batch, then
    /// restores the last one into an empty schema.
    pub fn run_full(&mut self) -> BenchResult<RunSummary> {
        let workload = self.config.workload.clone();
        let mut backups =
            MetricsLog::<BackupRow>::open_append(self.config.backup_log_path(Strategy::Full))?;
        let mut restores =
            MetricsLog::<RestoreRow>::open_append(self.config.restore_log_path(Strategy::Full))?;

        self.seed()?;
        self.report_size()?;

        let mut total = workload.initial_records;
        let mut latest = self.full_dump(FULL_DUMP_FILE)?;
        backups.append(&BackupRow {
            batch: 0,
            kind: "full".into(),
            records_inserted: total,
            backup_time_s: latest.duration_secs(),
            backup_size_mb: latest.size_mb(),
        })?;

        for batch in 1..=workload.batches {
            self.insert_batch(batch)?;
            total += workload.records_per_batch;
            latest = self.full_dump(FULL_DUMP_FILE)?;
            backups.append(&BackupRow {
                batch,
                kind: "full".into(),
                records_inserted: total,
                backup_time_s: latest.duration_secs(),
                backup_size_mb: latest.size_mb(),
            })?;
        }

        let rows_before_drop = self.db.row_count()?;
        self.reset()?;

        info!("Restoring from full backup...");
        let restore = self.restore_file(&latest.path)?;
        restores.append(&RestoreRow {
            phase: "full".into(),
            batch: 0,
            restore_time_s: restore.duration_secs(),
            cpu_before: cpu_column(restore.cpu_before),
            cpu_after: cpu_column(restore.cpu_after),
        })?;

        let rows_restored = self.verify()?;
        Ok(RunSummary {
            strategy: Strategy::Full,
            segments_captured: workload.batches,
            rows_before_drop,
            rows_expected: total,
            rows_restored,
            rotation: None,
        })
    }
}
