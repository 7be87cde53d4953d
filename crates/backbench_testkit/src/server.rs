//! In-memory stand-in for a MySQL server with binary logging.
//!
//! The fake keeps a row count instead of rows, and a list of binary log
//! files whose events record how many rows each committed insert added.
//! Offsets follow MySQL's shape: a fresh file starts at
//! [`LOG_HEADER_BYTES`] and every committed transaction appends one event.

use backbench_core::{BenchError, BenchResult, CustomerRecord, Database, LogPosition, LogWindow};
use parking_lot::Mutex;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::tools::FakeTools;

/// Offset of the first event in a fresh log file.
pub const LOG_HEADER_BYTES: u64 = 157;

/// Fixed bytes per insert event.
pub const EVENT_OVERHEAD_BYTES: u64 = 96;

/// Bytes each inserted row adds to its event.
pub const ROW_BYTES: u64 = 128;

/// One committed insert transaction in a binary log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Offset of the first byte of the event.
    pub start: u64,
    /// Offset just past the event.
    pub end: u64,
    /// Rows the transaction added.
    pub rows: u64,
}

/// One binary log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// File name as reported by `SHOW MASTER STATUS`.
    pub name: String,
    /// Current write offset.
    pub size: u64,
    /// Committed events in write order.
    pub events: Vec<LogEvent>,
}

impl LogFile {
    fn new(index: usize) -> Self {
        Self {
            name: format!("binlog.{index:06}"),
            size: LOG_HEADER_BYTES,
            events: Vec::new(),
        }
    }
}

/// A recorded call to one of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    /// Full dump written to a file.
    Dump {
        /// Output path.
        output: PathBuf,
        /// Rows captured.
        rows: u64,
    },
    /// Log extraction.
    Extract {
        /// Log file name.
        log_file: String,
        /// Requested window, if any.
        window: Option<LogWindow>,
        /// Rows captured.
        rows: u64,
    },
    /// Replay of a dump or log excerpt.
    Apply {
        /// Input path.
        input: PathBuf,
    },
}

/// Mutable server state shared by [`FakeServer`] and [`FakeTools`].
#[derive(Debug)]
pub(crate) struct ServerState {
    pub(crate) schema_exists: bool,
    pub(crate) table_exists: bool,
    pub(crate) rows: u64,
    pub(crate) logs: Vec<LogFile>,
    pub(crate) logging_enabled: bool,
    pub(crate) rotate_when_rows_reach: Option<u64>,
    pub(crate) fail_apply: Option<String>,
    pub(crate) calls: Vec<ToolCall>,
    pub(crate) flushes: usize,
    pub(crate) insert_statements: usize,
    pub(crate) transactions: usize,
    pub(crate) fail_insert_statement: Option<usize>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            schema_exists: true,
            table_exists: false,
            rows: 0,
            logs: vec![LogFile::new(1)],
            logging_enabled: true,
            rotate_when_rows_reach: None,
            fail_apply: None,
            calls: Vec::new(),
            flushes: 0,
            insert_statements: 0,
            transactions: 0,
            fail_insert_statement: None,
        }
    }

    pub(crate) fn rotate(&mut self) {
        let next = self.logs.len() + 1;
        self.logs.push(LogFile::new(next));
    }

    fn active_log(&mut self) -> &mut LogFile {
        if self.logs.is_empty() {
            self.logs.push(LogFile::new(1));
        }
        let last = self.logs.len() - 1;
        &mut self.logs[last]
    }

    pub(crate) fn log(&self, name: &str) -> Option<&LogFile> {
        self.logs.iter().find(|f| f.name == name)
    }

    pub(crate) fn require_table(&self) -> BenchResult<()> {
        if self.schema_exists && self.table_exists {
            Ok(())
        } else {
            Err(BenchError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "Table 'customers' doesn't exist",
            )))
        }
    }
}

/// A [`Database`] that lives entirely in memory.
///
/// Clones share state, so a test can keep a handle while the harness owns
/// another.
#[derive(Debug, Clone)]
pub struct FakeServer {
    state: Arc<Mutex<ServerState>>,
}

impl FakeServer {
    /// Creates a server with an empty schema and one empty log file.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ServerState::new())),
        }
    }

    /// Tools that dump from and replay into this server.
    pub fn tools(&self) -> FakeTools {
        FakeTools::new(Arc::clone(&self.state))
    }

    /// Turns binary logging off, as with `skip-log-bin`.
    pub fn disable_logging(&self) {
        self.state.lock().logging_enabled = false;
    }

    /// Rotates the log right after the insert that brings the table to
    /// `rows` or more, once.
    pub fn rotate_when_rows_reach(&self, rows: u64) {
        self.state.lock().rotate_when_rows_reach = Some(rows);
    }

    /// Makes every replay fail with `message`.
    pub fn fail_apply(&self, message: impl Into<String>) {
        self.state.lock().fail_apply = Some(message.into());
    }

    /// Makes the `n`th statement of the next insert transaction fail, once.
    pub fn fail_insert_at_statement(&self, n: usize) {
        self.state.lock().fail_insert_statement = Some(n);
    }

    /// Current row count, ignoring whether the table exists.
    pub fn rows(&self) -> u64 {
        self.state.lock().rows
    }

    /// Snapshot of the log files.
    pub fn logs(&self) -> Vec<LogFile> {
        self.state.lock().logs.clone()
    }

    /// Tool calls in the order they happened.
    pub fn calls(&self) -> Vec<ToolCall> {
        self.state.lock().calls.clone()
    }

    /// Windows passed to log extraction, in call order.
    pub fn extractions(&self) -> Vec<(String, Option<LogWindow>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ToolCall::Extract {
                    log_file, window, ..
                } => Some((log_file, window)),
                _ => None,
            })
            .collect()
    }

    /// Inputs passed to replay, in call order.
    pub fn applied(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ToolCall::Apply { input } => Some(input),
                _ => None,
            })
            .collect()
    }

    /// Number of `FLUSH LOGS` calls.
    pub fn flushes(&self) -> usize {
        self.state.lock().flushes
    }

    /// Number of insert statements executed, including rolled back ones.
    pub fn insert_statements(&self) -> usize {
        self.state.lock().insert_statements
    }

    /// Number of committed insert transactions.
    pub fn transactions(&self) -> usize {
        self.state.lock().transactions
    }
}

impl Default for FakeServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for FakeServer {
    fn recreate_table(&mut self) -> BenchResult<()> {
        let mut state = self.state.lock();
        state.table_exists = true;
        state.rows = 0;
        Ok(())
    }

    fn insert_records(
        &mut self,
        records: &[CustomerRecord],
        chunk_size: usize,
    ) -> BenchResult<()> {
        let mut state = self.state.lock();
        state.require_table()?;
        if records.is_empty() {
            return Ok(());
        }
        // Rows only become visible at commit, so a failed statement
        // discards the whole transaction.
        for statement in 1..=records.chunks(chunk_size.max(1)).count() {
            state.insert_statements += 1;
            if state.fail_insert_statement == Some(statement) {
                state.fail_insert_statement = None;
                return Err(BenchError::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "Lost connection to MySQL server during query",
                )));
            }
        }
        let count = records.len() as u64;
        state.rows += count;
        state.transactions += 1;

        if state.logging_enabled {
            let log = state.active_log();
            let start = log.size;
            let end = start + EVENT_OVERHEAD_BYTES + count * ROW_BYTES;
            log.events.push(LogEvent {
                start,
                end,
                rows: count,
            });
            log.size = end;

            if let Some(threshold) = state.rotate_when_rows_reach {
                if state.rows >= threshold {
                    state.rotate_when_rows_reach = None;
                    state.rotate();
                }
            }
        }
        Ok(())
    }

    fn flush_logs(&mut self) -> BenchResult<()> {
        let mut state = self.state.lock();
        state.flushes += 1;
        if state.logging_enabled {
            state.rotate();
        }
        Ok(())
    }

    fn log_position(&mut self) -> BenchResult<LogPosition> {
        let mut state = self.state.lock();
        if !state.logging_enabled {
            return Err(BenchError::MissingLogStatus);
        }
        let log = state.active_log();
        Ok(LogPosition::new(log.name.clone(), log.size))
    }

    fn row_count(&mut self) -> BenchResult<u64> {
        let state = self.state.lock();
        state.require_table()?;
        Ok(state.rows)
    }

    fn size_bytes(&mut self) -> BenchResult<u64> {
        let state = self.state.lock();
        Ok(if state.table_exists { state.rows * ROW_BYTES } else { 0 })
    }

    fn reset_schema(&mut self) -> BenchResult<()> {
        let mut state = self.state.lock();
        state.schema_exists = true;
        state.table_exists = false;
        state.rows = 0;
        Ok(())
    }
}
