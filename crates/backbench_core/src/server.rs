//! MySQL implementation of [`Database`].

use crate::config::{BenchConfig, ConnectionConfig};
use crate::database::Database;
use crate::error::{BenchError, BenchResult};
use crate::types::{CustomerRecord, LogPosition};
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Row, TxOpts};
use tracing::debug;

/// A [`Database`] backed by a live MySQL server.
///
/// A fresh connection is opened for each call, so a dropped schema never
/// leaves a connection pointing at a missing default database.
#[derive(Debug, Clone)]
pub struct MysqlDatabase {
    connection: ConnectionConfig,
    table: String,
}

impl MysqlDatabase {
    /// Creates a client for the configured server and table.
    ///
    /// The config is validated here because schema and table names are
    /// interpolated into DDL.
    pub fn new(config: &BenchConfig) -> BenchResult<Self> {
        config.validate()?;
        Ok(Self {
            connection: config.connection.clone(),
            table: config.table.clone(),
        })
    }

    fn connect(&self, use_db: bool) -> BenchResult<Conn> {
        let c = &self.connection;
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(c.host.as_str()))
            .tcp_port(c.port)
            .user(Some(c.user.as_str()))
            .pass(Some(c.password.as_str()))
            .db_name(use_db.then_some(c.database.as_str()));
        Ok(Conn::new(opts)?)
    }
}

impl Database for MysqlDatabase {
    fn recreate_table(&mut self) -> BenchResult<()> {
        let mut conn = self.connect(true)?;
        debug!(table = %self.table, "recreating table");
        conn.query_drop(format!("DROP TABLE IF EXISTS `{}`", self.table))?;
        conn.query_drop(format!(
            "CREATE TABLE `{}` (
                id INT AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(100),
                email VARCHAR(100),
                address TEXT
            )",
            self.table
        ))?;
        Ok(())
    }

    fn insert_records(
        &mut self,
        records: &[CustomerRecord],
        chunk_size: usize,
    ) -> BenchResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut conn = self.connect(true)?;
        // Dropping the transaction on an early return rolls it back.
        let mut tx = conn.start_transaction(TxOpts::default())?;
        for chunk in records.chunks(chunk_size.max(1)) {
            let placeholders = vec!["(?, ?, ?)"; chunk.len()].join(", ");
            let statement = format!(
                "INSERT INTO `{}` (name, email, address) VALUES {}",
                self.table, placeholders
            );
            let params: Vec<mysql::Value> = chunk
                .iter()
                .flat_map(|r| {
                    [
                        mysql::Value::from(r.name.clone()),
                        mysql::Value::from(r.email.clone()),
                        mysql::Value::from(r.address.clone()),
                    ]
                })
                .collect();
            tx.exec_drop(statement, params)?;
        }
        tx.commit()?;
        debug!(rows = records.len(), "insert committed");
        Ok(())
    }

    fn flush_logs(&mut self) -> BenchResult<()> {
        let mut conn = self.connect(true)?;
        conn.query_drop("FLUSH LOGS")?;
        Ok(())
    }

    fn log_position(&mut self) -> BenchResult<LogPosition> {
        let mut conn = self.connect(true)?;
        let row: Row = conn
            .query_first("SHOW MASTER STATUS")?
            .ok_or(BenchError::MissingLogStatus)?;
        let file: String = row.get(0).ok_or(BenchError::MissingLogStatus)?;
        let offset: u64 = row.get(1).ok_or(BenchError::MissingLogStatus)?;
        Ok(LogPosition::new(file, offset))
    }

    fn row_count(&mut self) -> BenchResult<u64> {
        let mut conn = self.connect(true)?;
        let count: Option<u64> =
            conn.query_first(format!("SELECT COUNT(*) FROM `{}`", self.table))?;
        Ok(count.unwrap_or(0))
    }

    fn size_bytes(&mut self) -> BenchResult<u64> {
        let mut conn = self.connect(true)?;
        let size: Option<u64> = conn.exec_first(
            "SELECT CAST(COALESCE(SUM(data_length + index_length), 0) AS UNSIGNED)
             FROM information_schema.tables
             WHERE table_schema = ?",
            (self.connection.database.clone(),),
        )?;
        Ok(size.unwrap_or(0))
    }

    fn reset_schema(&mut self) -> BenchResult<()> {
        let mut conn = self.connect(false)?;
        let name = &self.connection.database;
        conn.query_drop(format!("DROP DATABASE IF EXISTS `{name}`"))?;
        conn.query_drop(format!("CREATE DATABASE `{name}`"))?;
        Ok(())
    }
}
