//! Sheet store: every identity shares two tabular files
//!
//! ```text
//! <root>/weights.csv   user_id,date,weight
//! <root>/profiles.csv  user_id,key,value
//! ```
//!
//! The single-user partition uses an empty `user_id`. Upserts locate the
//! affected row and replace it in place; rows of other users, and rows that
//! do not parse, are carried over untouched.

use super::csv_io::{format_date, parse_measurement_logged, Table};
use super::{partition_key, MeasurementStore, ProfileStore, Store, StoreResult};
use async_trait::async_trait;
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;
use weight_plan_shared::{Identity, Measurement, MeasurementLog, ProfileFields, UpsertOutcome};

const WEIGHT_COLUMNS: [&str; 3] = ["user_id", "date", "weight"];
const PROFILE_COLUMNS: [&str; 3] = ["user_id", "key", "value"];

pub struct SheetStore {
    weights_path: PathBuf,
    profiles_path: PathBuf,
    /// Serializes read-modify-write cycles; partitions share the files
    write_lock: Mutex<()>,
}

impl SheetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            weights_path: root.join("weights.csv"),
            profiles_path: root.join("profiles.csv"),
            write_lock: Mutex::new(()),
        }
    }

    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }
}

/// Rebuild a record with one cell replaced, padding a short row with empty
/// cells up to `index`
fn with_cell(record: &StringRecord, index: usize, value: &str) -> StringRecord {
    let width = record.len().max(index + 1);
    (0..width)
        .map(|i| {
            if i == index {
                value
            } else {
                record.get(i).unwrap_or("")
            }
        })
        .collect()
}

/// Record laid out in `headers` order from named values
fn record_for(headers: &StringRecord, values: &[(&str, &str)]) -> StringRecord {
    headers
        .iter()
        .map(|h| {
            values
                .iter()
                .find(|(name, _)| *name == h)
                .map(|(_, v)| *v)
                .unwrap_or("")
        })
        .collect()
}

#[async_trait]
impl MeasurementStore for SheetStore {
    async fn load(&self, identity: Option<&Identity>) -> StoreResult<MeasurementLog> {
        let path = &self.weights_path;
        let table = Table::load(path, &WEIGHT_COLUMNS).await?;
        let idx = table.column_indices(path, &WEIGHT_COLUMNS)?;
        let user = partition_key(identity);

        let records = table
            .records
            .iter()
            .filter(|r| r.get(idx[0]).unwrap_or("") == user)
            .filter_map(|r| {
                parse_measurement_logged(
                    r.get(idx[1]).unwrap_or(""),
                    r.get(idx[2]).unwrap_or(""),
                    path,
                )
            });
        Ok(MeasurementLog::from_records(records))
    }

    async fn upsert(
        &self,
        identity: Option<&Identity>,
        measurement: Measurement,
    ) -> StoreResult<UpsertOutcome> {
        let _guard = self.write_lock.lock().await;
        let path = &self.weights_path;
        let mut table = Table::load(path, &WEIGHT_COLUMNS).await?;
        let idx = table.column_indices(path, &WEIGHT_COLUMNS)?;
        let user = partition_key(identity);
        let date = format_date(measurement.date);
        let weight = measurement.weight_kg.to_string();

        let mut previous: Option<Option<f64>> = None;
        for record in table.records.iter_mut() {
            let same_row = record.get(idx[0]).unwrap_or("") == user
                && record.get(idx[1]).unwrap_or("") == date;
            if same_row {
                let old = record
                    .get(idx[2])
                    .and_then(|w| w.trim().parse::<f64>().ok())
                    .filter(|w| w.is_finite() && *w > 0.0);
                previous = Some(old);
                *record = with_cell(record, idx[2], &weight);
            }
        }

        let outcome = match previous {
            Some(Some(previous_weight_kg)) => UpsertOutcome::Updated { previous_weight_kg },
            // A row existed but held no readable weight
            Some(None) => UpsertOutcome::Inserted,
            None => {
                let row = record_for(
                    &table.headers,
                    &[
                        ("user_id", user),
                        ("date", date.as_str()),
                        ("weight", weight.as_str()),
                    ],
                );
                table.records.push(row);
                UpsertOutcome::Inserted
            }
        };

        table.save(path).await?;
        debug!(user_id = user, date = %date, "Upserted sheet row");
        Ok(outcome)
    }

    async fn clear(&self, identity: Option<&Identity>) -> StoreResult<usize> {
        let _guard = self.write_lock.lock().await;
        let path = &self.weights_path;
        let mut table = Table::load(path, &WEIGHT_COLUMNS).await?;
        let idx = table.column_indices(path, &WEIGHT_COLUMNS)?;
        let user = partition_key(identity);

        let before = table.records.len();
        table.records.retain(|r| r.get(idx[0]).unwrap_or("") != user);
        let removed = before - table.records.len();
        if removed > 0 {
            table.save(path).await?;
        }
        Ok(removed)
    }
}

#[async_trait]
impl ProfileStore for SheetStore {
    async fn get_fields(&self, identity: Option<&Identity>) -> StoreResult<ProfileFields> {
        let path = &self.profiles_path;
        let table = Table::load(path, &PROFILE_COLUMNS).await?;
        let idx = table.column_indices(path, &PROFILE_COLUMNS)?;
        let user = partition_key(identity);

        Ok(table
            .records
            .iter()
            .filter(|r| r.get(idx[0]).unwrap_or("") == user)
            .filter_map(|r| Some((r.get(idx[1])?.to_string(), r.get(idx[2])?.to_string())))
            .filter(|(k, _)| !k.is_empty())
            .collect())
    }

    async fn save_fields(
        &self,
        identity: Option<&Identity>,
        fields: &ProfileFields,
    ) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let path = &self.profiles_path;
        let mut table = Table::load(path, &PROFILE_COLUMNS).await?;
        let idx = table.column_indices(path, &PROFILE_COLUMNS)?;
        let user = partition_key(identity);

        for (key, value) in fields {
            let mut found = false;
            for record in table.records.iter_mut() {
                if record.get(idx[0]).unwrap_or("") == user
                    && record.get(idx[1]).unwrap_or("") == key.as_str()
                {
                    *record = with_cell(record, idx[2], value.as_str());
                    found = true;
                }
            }
            if !found {
                let row = record_for(
                    &table.headers,
                    &[
                        ("user_id", user),
                        ("key", key.as_str()),
                        ("value", value.as_str()),
                    ],
                );
                table.records.push(row);
            }
        }

        table.save(path).await
    }
}

#[async_trait]
impl Store for SheetStore {
    fn backend_name(&self) -> &'static str {
        "sheet"
    }

    async fn health_check(&self) -> StoreResult<()> {
        let table = Table::load(&self.weights_path, &WEIGHT_COLUMNS).await?;
        table.column_indices(&self.weights_path, &WEIGHT_COLUMNS)?;
        Ok(())
    }
}
