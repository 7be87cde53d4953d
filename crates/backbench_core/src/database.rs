//! Database trait definition.

use crate::error::BenchResult;
use crate::types::{CustomerRecord, LogPosition};

/// The server-side operations the workflows need.
///
/// Implementations talk to a live server ([`crate::MysqlDatabase`]) or
/// simulate one for tests. The workflows never issue SQL themselves.
///
/// # Invariants
///
/// - `insert_records` commits every chunk of a call or none of them
/// - `log_position` reflects every committed insert
/// - `reset_schema` leaves an empty schema with the configured name
pub trait Database {
    /// Drops the benchmark table if present and creates it empty.
    fn recreate_table(&mut self) -> BenchResult<()>;

    /// Inserts the records in one transaction, `chunk_size` rows per
    /// statement.
    fn insert_records(&mut self, records: &[CustomerRecord], chunk_size: usize)
        -> BenchResult<()>;

    /// Closes the current binary log and opens the next one.
    fn flush_logs(&mut self) -> BenchResult<()>;

    /// Returns the current binary log file and write offset.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BenchError::MissingLogStatus`] if binary logging is
    /// disabled on the server.
    fn log_position(&mut self) -> BenchResult<LogPosition>;

    /// Counts rows in the benchmark table.
    fn row_count(&mut self) -> BenchResult<u64>;

    /// Data plus index bytes used by the benchmark schema.
    fn size_bytes(&mut self) -> BenchResult<u64>;

    /// Drops the whole schema and creates it again, empty.
    fn reset_schema(&mut self) -> BenchResult<()>;
}
