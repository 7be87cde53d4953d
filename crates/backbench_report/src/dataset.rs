//! Loading every strategy's metrics from a work directory.

use crate::error::{ReportError, ReportResult};
use crate::table::MetricsTable;
use backbench_core::Strategy;
use std::path::Path;
use tracing::{debug, warn};

/// Backup and restore metrics for one strategy.
#[derive(Debug, Clone)]
pub struct StrategyMetrics {
    /// Strategy the files belong to.
    pub strategy: Strategy,
    /// Backup log.
    pub backup: MetricsTable,
    /// Restore log.
    pub restore: MetricsTable,
}

/// Metrics for every strategy that has both files, in report order.
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    strategies: Vec<StrategyMetrics>,
}

impl ReportData {
    /// Builds report data from already-loaded metrics.
    pub fn new(strategies: Vec<StrategyMetrics>) -> Self {
        Self { strategies }
    }

    /// Loaded strategies.
    pub fn strategies(&self) -> &[StrategyMetrics] {
        &self.strategies
    }

    /// Metrics for one strategy, if loaded.
    pub fn get(&self, strategy: Strategy) -> Option<&StrategyMetrics> {
        self.strategies.iter().find(|m| m.strategy == strategy)
    }

    /// Returns true if nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Reads the backup and restore logs of every strategy from `dir`.
///
/// A strategy missing either file is skipped with a warning.
///
/// # Errors
///
/// Returns [`ReportError::NoData`] if no strategy has both files, or the
/// underlying error if a file exists but cannot be parsed.
pub fn load_all(dir: &Path) -> ReportResult<ReportData> {
    let mut strategies = Vec::new();
    for strategy in Strategy::ALL {
        let backup = dir.join(strategy.backup_log_file());
        let restore = dir.join(strategy.restore_log_file());
        if !backup.is_file() || !restore.is_file() {
            warn!(
                "Skipping {}: expected {} and {} in {}",
                strategy,
                strategy.backup_log_file(),
                strategy.restore_log_file(),
                dir.display()
            );
            continue;
        }
        let metrics = StrategyMetrics {
            strategy,
            backup: MetricsTable::from_path(&backup)?,
            restore: MetricsTable::from_path(&restore)?,
        };
        debug!(
            strategy = %strategy,
            backups = metrics.backup.len(),
            restores = metrics.restore.len(),
            "loaded metrics"
        );
        strategies.push(metrics);
    }
    if strategies.is_empty() {
        return Err(ReportError::NoData {
            dir: dir.to_path_buf(),
        });
    }
    Ok(ReportData { strategies })
}
