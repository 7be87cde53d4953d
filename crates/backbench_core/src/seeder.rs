//! Synthetic customer data.

use crate::database::Database;
use crate::error::{BenchError, BenchResult};
use crate::types::CustomerRecord;
use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Produces fake customer records.
///
/// With a seed the sequence is reproducible across runs.
pub struct RecordGenerator {
    rng: StdRng,
}

impl RecordGenerator {
    /// Creates a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a generator from an optional seed.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }

    /// Generates one record.
    pub fn record(&mut self) -> CustomerRecord {
        let name: String = Name().fake_with_rng(&mut self.rng);
        let email: String = SafeEmail().fake_with_rng(&mut self.rng);
        let number: String = BuildingNumber().fake_with_rng(&mut self.rng);
        let street: String = StreetName().fake_with_rng(&mut self.rng);
        let city: String = CityName().fake_with_rng(&mut self.rng);
        let state: String = StateAbbr().fake_with_rng(&mut self.rng);
        let zip: String = ZipCode().fake_with_rng(&mut self.rng);
        CustomerRecord {
            name,
            email,
            address: format!("{number} {street} {city}, {state} {zip}"),
        }
    }

    /// Generates `count` records.
    pub fn records(&mut self, count: usize) -> Vec<CustomerRecord> {
        (0..count).map(|_| self.record()).collect()
    }
}

impl Default for RecordGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops and recreates the table, then fills it with `count` rows.
pub fn seed_table<D: Database>(
    db: &mut D,
    generator: &mut RecordGenerator,
    count: u64,
    chunk: usize,
) -> BenchResult<()> {
    db.recreate_table()?;
    insert_batch(db, generator, count, chunk)
}

/// Appends `count` rows in one transaction, `chunk` rows per statement.
///
/// A failure leaves none of the batch behind.
pub fn insert_batch<D: Database>(
    db: &mut D,
    generator: &mut RecordGenerator,
    count: u64,
    chunk: usize,
) -> BenchResult<()> {
    if count == 0 {
        return Ok(());
    }
    let count = usize::try_from(count)
        .map_err(|_| BenchError::invalid_config(format!("batch of {count} rows is too large")))?;
    let records = generator.records(count);
    debug!(rows = count, chunk, "inserting batch");
    db.insert_records(&records, chunk.max(1))
}
