//! Benchmark configuration.
//!
//! Every workflow takes a [`BenchConfig`] by reference; nothing is read from
//! process-wide state. Values can be built in code with the builder setters
//! or loaded from a TOML file where every key is optional:
//!
//! ```toml
//! work_dir = "runs/2026-10-19"
//! seed = 42
//! cpu_sample_interval_ms = 1000
//!
//! [connection]
//! host = "db.internal"
//! password = "secret"
//!
//! [workload]
//! initial_records = 400000
//! batches = 10
//! records_per_batch = 10000
//! ```

use crate::error::{BenchError, BenchResult};
use crate::types::Strategy;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Three placeholders per row must stay under the server's 65 535 limit.
pub const MAX_INSERT_CHUNK: usize = 20_000;

/// Connection settings for the MySQL server under test.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Server host name.
    pub host: String,
    /// Server TCP port.
    pub port: u16,
    /// Account used for seeding, dumping and restoring.
    pub user: String,
    /// Password for `user`.
    pub password: String,
    /// Schema that holds the benchmark table.
    pub database: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "testuser".to_string(),
            password: "testpass".to_string(),
            database: "testdb".to_string(),
        }
    }
}

/// Size of the synthetic workload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadConfig {
    /// Rows inserted before the first full backup.
    pub initial_records: u64,
    /// Number of insertion batches after the first full backup.
    pub batches: u32,
    /// Rows per insertion batch.
    pub records_per_batch: u64,
    /// Rows per multi-row INSERT statement.
    pub insert_chunk_size: usize,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            initial_records: 400_000,
            batches: 10,
            records_per_batch: 10_000,
            insert_chunk_size: 1_000,
        }
    }
}

/// Paths to the external database utilities.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolPaths {
    /// Logical dump utility.
    pub mysqldump: PathBuf,
    /// Binary log extraction utility.
    pub mysqlbinlog: PathBuf,
    /// Command-line client used to replay dumps and log excerpts.
    pub mysql: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            mysqldump: PathBuf::from("mysqldump"),
            mysqlbinlog: PathBuf::from("mysqlbinlog"),
            mysql: PathBuf::from("mysql"),
        }
    }
}

/// Configuration for one benchmark run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Server connection.
    pub connection: ConnectionConfig,
    /// Workload size.
    pub workload: WorkloadConfig,
    /// External utility paths.
    pub tools: ToolPaths,
    /// Name of the benchmark table.
    pub table: String,
    /// Directory holding the server's binary log files.
    pub binlog_dir: PathBuf,
    /// Directory receiving dump files, log excerpts and CSV metrics.
    pub work_dir: PathBuf,
    /// Measurement window for each CPU sample.
    #[serde(rename = "cpu_sample_interval_ms", deserialize_with = "duration_from_millis")]
    pub cpu_sample_interval: Duration,
    /// Seed for the synthetic data generator; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            workload: WorkloadConfig::default(),
            tools: ToolPaths::default(),
            table: "customers".to_string(),
            binlog_dir: PathBuf::from("/var/log/mysql"),
            work_dir: PathBuf::from("."),
            cpu_sample_interval: Duration::from_secs(1),
            seed: None,
        }
    }
}

fn duration_from_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

impl BenchConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> BenchResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: &Path) -> BenchResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Sets the connection settings.
    #[must_use]
    pub fn connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Sets the binary log directory.
    #[must_use]
    pub fn binlog_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.binlog_dir = dir.into();
        self
    }

    /// Sets the number of rows seeded before the first backup.
    #[must_use]
    pub const fn initial_records(mut self, count: u64) -> Self {
        self.workload.initial_records = count;
        self
    }

    /// Sets the number of insertion batches.
    #[must_use]
    pub const fn batches(mut self, count: u32) -> Self {
        self.workload.batches = count;
        self
    }

    /// Sets the rows inserted per batch.
    #[must_use]
    pub const fn records_per_batch(mut self, count: u64) -> Self {
        self.workload.records_per_batch = count;
        self
    }

    /// Sets the rows per INSERT statement.
    #[must_use]
    pub const fn insert_chunk_size(mut self, size: usize) -> Self {
        self.workload.insert_chunk_size = size;
        self
    }

    /// Sets the CPU sampling window.
    #[must_use]
    pub const fn cpu_sample_interval(mut self, interval: Duration) -> Self {
        self.cpu_sample_interval = interval;
        self
    }

    /// Sets the data generator seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks identifiers and sizes before anything touches the server.
    ///
    /// Schema and table names are interpolated into DDL, so they are
    /// restricted to plain identifiers.
    pub fn validate(&self) -> BenchResult<()> {
        check_identifier("database", &self.connection.database)?;
        check_identifier("table", &self.table)?;
        if self.workload.records_per_batch == 0 && self.workload.batches > 0 {
            return Err(BenchError::invalid_config(
                "records_per_batch must be greater than zero",
            ));
        }
        if self.workload.insert_chunk_size == 0 {
            return Err(BenchError::invalid_config(
                "insert_chunk_size must be greater than zero",
            ));
        }
        if self.workload.insert_chunk_size > MAX_INSERT_CHUNK {
            return Err(BenchError::invalid_config(format!(
                "insert_chunk_size must be at most {MAX_INSERT_CHUNK}"
            )));
        }
        if self.checked_final_rows().is_none() {
            return Err(BenchError::invalid_config(
                "initial_records + batches * records_per_batch overflows a row count",
            ));
        }
        Ok(())
    }

    /// Row count expected after every batch has been inserted.
    ///
    /// Saturates for configurations that [`validate`](Self::validate)
    /// rejects.
    pub fn expected_final_rows(&self) -> u64 {
        self.checked_final_rows().unwrap_or(u64::MAX)
    }

    fn checked_final_rows(&self) -> Option<u64> {
        u64::from(self.workload.batches)
            .checked_mul(self.workload.records_per_batch)?
            .checked_add(self.workload.initial_records)
    }

    /// Path of an artifact inside the work directory.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    /// Path of the backup metrics CSV for a strategy.
    pub fn backup_log_path(&self, strategy: Strategy) -> PathBuf {
        self.work_dir.join(strategy.backup_log_file())
    }

    /// Path of the restore metrics CSV for a strategy.
    pub fn restore_log_path(&self, strategy: Strategy) -> PathBuf {
        self.work_dir.join(strategy.restore_log_file())
    }
}

fn check_identifier(what: &str, name: &str) -> BenchResult<()> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(BenchError::invalid_config(format!(
            "{what} name {name:?} must be a plain identifier"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.connection.database, "testdb");
        assert_eq!(config.connection.user, "testuser");
        assert_eq!(config.table, "customers");
        assert_eq!(config.binlog_dir, PathBuf::from("/var/log/mysql"));
        assert_eq!(config.expected_final_rows(), 500_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = BenchConfig::new()
            .initial_records(100)
            .batches(3)
            .records_per_batch(7)
            .seed(9)
            .work_dir("/tmp/run");

        assert_eq!(config.expected_final_rows(), 121);
        assert_eq!(config.seed, Some(9));
        assert_eq!(
            config.backup_log_path(Strategy::LogBased),
            PathBuf::from("/tmp/run/log_based_backup_log.csv")
        );
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let config = BenchConfig::from_toml_str(
            r#"
            work_dir = "out"
            cpu_sample_interval_ms = 250

            [connection]
            host = "db.internal"

            [workload]
            batches = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.connection.host, "db.internal");
        assert_eq!(config.connection.port, 3306);
        assert_eq!(config.workload.batches, 4);
        assert_eq!(config.workload.records_per_batch, 10_000);
        assert_eq!(config.cpu_sample_interval, Duration::from_millis(250));
        assert_eq!(config.work_dir, PathBuf::from("out"));
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = BenchConfig::from_toml_str("batch_size = 3").unwrap_err();
        assert!(matches!(err, BenchError::ConfigParse(_)));
    }

    #[test]
    fn validate_rejects_injected_names() {
        let mut config = BenchConfig::default();
        config.connection.database = "testdb; DROP DATABASE mysql".into();
        assert!(matches!(
            config.validate(),
            Err(BenchError::InvalidConfig { .. })
        ));

        let mut config = BenchConfig::default();
        config.table = "1customers".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_chunk_out_of_range() {
        let config = BenchConfig::default().insert_chunk_size(0);
        assert!(config.validate().is_err());
        let config = BenchConfig::default().insert_chunk_size(MAX_INSERT_CHUNK + 1);
        assert!(config.validate().is_err());
        let config = BenchConfig::default().insert_chunk_size(MAX_INSERT_CHUNK);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_row_count_overflow() {
        let config = BenchConfig::default()
            .initial_records(u64::MAX)
            .batches(1)
            .records_per_batch(1);
        assert!(matches!(
            config.validate(),
            Err(BenchError::InvalidConfig { .. })
        ));
        assert_eq!(config.expected_final_rows(), u64::MAX);

        let config = BenchConfig::default()
            .batches(u32::MAX)
            .records_per_batch(u64::MAX / 2);
        assert!(config.validate().is_err());

        let config = BenchConfig::default().initial_records(u64::MAX).batches(0);
        assert!(config.validate().is_ok());
    }
}
