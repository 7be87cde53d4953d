//! Property-based test generators using proptest.

use backbench_core::{BenchConfig, CustomerRecord, LogPosition};
use proptest::prelude::*;

/// A small workload: seed rows, batch count, rows per batch, chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Workload {
    /// Rows inserted before the first backup.
    pub initial_records: u64,
    /// Number of batches.
    pub batches: u32,
    /// Rows per batch.
    pub records_per_batch: u64,
    /// Rows per insert statement.
    pub insert_chunk_size: usize,
}

impl Workload {
    /// Applies the workload to `config`.
    pub fn apply(self, config: BenchConfig) -> BenchConfig {
        config
            .initial_records(self.initial_records)
            .batches(self.batches)
            .records_per_batch(self.records_per_batch)
            .insert_chunk_size(self.insert_chunk_size)
    }

    /// Rows in the table after the last batch.
    pub fn final_rows(self) -> u64 {
        self.initial_records + u64::from(self.batches) * self.records_per_batch
    }
}

/// Strategy for small workloads that pass validation.
pub fn workload_strategy() -> impl Strategy<Value = Workload> {
    (0u64..60, 0u32..6, 1u64..25, 1usize..16).prop_map(
        |(initial_records, batches, records_per_batch, insert_chunk_size)| Workload {
            initial_records,
            batches,
            records_per_batch,
            insert_chunk_size,
        },
    )
}

/// Strategy for valid MySQL identifiers.
pub fn identifier_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,63}").expect("Invalid regex")
}

/// Strategy for customer records with printable fields.
pub fn customer_strategy() -> impl Strategy<Value = CustomerRecord> {
    (
        "[A-Z][a-z]{1,10} [A-Z][a-z]{1,12}",
        "[a-z]{1,12}@example\\.(com|org|net)",
        "[0-9]{1,4} [A-Z][a-z]{2,10} St [A-Z][a-z]{2,10}, [A-Z]{2} [0-9]{5}",
    )
        .prop_map(|(name, email, address)| CustomerRecord {
            name,
            email,
            address,
        })
}

/// Strategy for a starting log position and a list of forward steps within
/// the same file.
pub fn log_walk_strategy() -> impl Strategy<Value = (LogPosition, Vec<u64>)> {
    (
        1u32..1000,
        4u64..1_000_000,
        prop::collection::vec(0u64..100_000, 0..20),
    )
        .prop_map(|(index, offset, steps)| {
            (LogPosition::new(format!("binlog.{index:06}"), offset), steps)
        })
}
