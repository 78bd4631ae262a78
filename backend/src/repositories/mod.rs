//! Storage repositories
//!
//! Measurement and profile persistence behind two async traits, with three
//! interchangeable backends:
//!
//! - [`FlatFileStore`]: one `date,weight` CSV per identity, rewritten in full
//!   on every upsert (read, modify, sort, write)
//! - [`SheetStore`]: two shared tabular files keyed by `user_id`, updated by
//!   locating and replacing the single affected row
//! - [`MemoryStore`]: an index keyed by (identity, date) with point upserts
//!
//! # Known limitation
//!
//! The file-backed stores are not safe against other *processes* writing the
//! same files: two concurrent read-modify-write cycles can lose one update.
//! Inside one process, writers are serialized (see `services::locks`).

mod csv_io;
pub mod flat_file;
pub mod memory;
pub mod sheet;

pub use flat_file::FlatFileStore;
pub use memory::MemoryStore;
pub use sheet::SheetStore;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use weight_plan_shared::{Identity, Measurement, MeasurementLog, ProfileFields, UpsertOutcome};

/// Storage error types
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Partition key used inside tabular and indexed stores; the single-user
/// partition is the empty string.
pub(crate) fn partition_key(identity: Option<&Identity>) -> &str {
    identity.map(Identity::as_str).unwrap_or("")
}

/// Daily weight persistence
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// All measurements of a partition, ascending by date; empty when none
    async fn load(&self, identity: Option<&Identity>) -> StoreResult<MeasurementLog>;

    /// Insert or replace the measurement for `measurement.date`
    async fn upsert(
        &self,
        identity: Option<&Identity>,
        measurement: Measurement,
    ) -> StoreResult<UpsertOutcome>;

    /// Delete every measurement of a partition, returning how many were removed
    async fn clear(&self, identity: Option<&Identity>) -> StoreResult<usize>;
}

/// Profile persistence as raw named fields
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Stored fields only; defaults are applied by the caller
    async fn get_fields(&self, identity: Option<&Identity>) -> StoreResult<ProfileFields>;

    /// Upsert each given field, leaving other stored keys untouched
    async fn save_fields(
        &self,
        identity: Option<&Identity>,
        fields: &ProfileFields,
    ) -> StoreResult<()>;
}

/// A complete backing store
#[async_trait]
pub trait Store: MeasurementStore + ProfileStore {
    fn backend_name(&self) -> &'static str;

    /// Verify the store can currently be read
    async fn health_check(&self) -> StoreResult<()>;
}
