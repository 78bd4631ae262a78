//! Flat-file store: one directory per identity
//!
//! ```text
//! <root>/measurements.csv              single-user partition
//! <root>/profile.csv
//! <root>/users/<identity>/measurements.csv
//! <root>/users/<identity>/profile.csv
//! ```
//!
//! Measurement files hold `date,weight` rows and are rewritten in full,
//! sorted by date, on every change.

use super::csv_io::{self, format_date, parse_measurement_logged, Table};
use super::{MeasurementStore, ProfileStore, Store, StoreResult};
use async_trait::async_trait;
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tracing::debug;
use weight_plan_shared::{Identity, Measurement, MeasurementLog, ProfileFields, UpsertOutcome};

const MEASUREMENT_COLUMNS: [&str; 2] = ["date", "weight"];
const PROFILE_COLUMNS: [&str; 2] = ["key", "value"];

pub struct FlatFileStore {
    root: PathBuf,
}

impl FlatFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn partition_dir(&self, identity: Option<&Identity>) -> PathBuf {
        match identity {
            Some(id) => self.root.join("users").join(id.as_str()),
            None => self.root.clone(),
        }
    }

    fn measurements_path(&self, identity: Option<&Identity>) -> PathBuf {
        self.partition_dir(identity).join("measurements.csv")
    }

    fn profile_path(&self, identity: Option<&Identity>) -> PathBuf {
        self.partition_dir(identity).join("profile.csv")
    }

    async fn read_log(&self, path: &Path) -> StoreResult<MeasurementLog> {
        let table = Table::load(path, &MEASUREMENT_COLUMNS).await?;
        let idx = table.column_indices(path, &MEASUREMENT_COLUMNS)?;
        let records = table.records.iter().filter_map(|r| {
            parse_measurement_logged(
                r.get(idx[0]).unwrap_or(""),
                r.get(idx[1]).unwrap_or(""),
                path,
            )
        });
        Ok(MeasurementLog::from_records(records))
    }

    async fn write_log(&self, path: &Path, log: &MeasurementLog) -> StoreResult<()> {
        let mut table = Table::empty(&MEASUREMENT_COLUMNS);
        table.records = log
            .iter()
            .map(|m| StringRecord::from(vec![format_date(m.date), m.weight_kg.to_string()]))
            .collect();
        table.save(path).await
    }
}

#[async_trait]
impl MeasurementStore for FlatFileStore {
    async fn load(&self, identity: Option<&Identity>) -> StoreResult<MeasurementLog> {
        self.read_log(&self.measurements_path(identity)).await
    }

    async fn upsert(
        &self,
        identity: Option<&Identity>,
        measurement: Measurement,
    ) -> StoreResult<UpsertOutcome> {
        let path = self.measurements_path(identity);
        let mut log = self.read_log(&path).await?;
        let outcome = log.upsert(measurement.date, measurement.weight_kg);
        self.write_log(&path, &log).await?;
        debug!(path = %path.display(), entries = log.len(), "Rewrote measurement file");
        Ok(outcome)
    }

    async fn clear(&self, identity: Option<&Identity>) -> StoreResult<usize> {
        let path = self.measurements_path(identity);
        let removed = self.read_log(&path).await?.len();
        csv_io::remove_if_exists(&path).await?;
        Ok(removed)
    }
}

#[async_trait]
impl ProfileStore for FlatFileStore {
    async fn get_fields(&self, identity: Option<&Identity>) -> StoreResult<ProfileFields> {
        let path = self.profile_path(identity);
        let table = Table::load(&path, &PROFILE_COLUMNS).await?;
        let idx = table.column_indices(&path, &PROFILE_COLUMNS)?;
        Ok(table
            .records
            .iter()
            .filter_map(|r| Some((r.get(idx[0])?.to_string(), r.get(idx[1])?.to_string())))
            .filter(|(k, _)| !k.is_empty())
            .collect())
    }

    async fn save_fields(
        &self,
        identity: Option<&Identity>,
        fields: &ProfileFields,
    ) -> StoreResult<()> {
        let mut merged = self.get_fields(identity).await?;
        merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut table = Table::empty(&PROFILE_COLUMNS);
        table.records = merged
            .iter()
            .map(|(k, v)| StringRecord::from(vec![k.as_str(), v.as_str()]))
            .collect();
        table.save(&self.profile_path(identity)).await
    }
}

#[async_trait]
impl Store for FlatFileStore {
    fn backend_name(&self) -> &'static str {
        "flat_file"
    }

    async fn health_check(&self) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| super::StoreError::io(&self.root, e))?;
        tokio::fs::metadata(&self.root)
            .await
            .map(|_| ())
            .map_err(|e| super::StoreError::io(&self.root, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn store() -> (tempfile::TempDir, FlatFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_load_without_file_is_empty() {
        let (_dir, store) = store();
        assert!(store.load(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_keeps_file_sorted() {
        let (_dir, store) = store();
        store.upsert(None, Measurement::new(day(3), 70.0)).await.unwrap();
        store.upsert(None, Measurement::new(day(1), 71.0)).await.unwrap();
        store.upsert(None, Measurement::new(day(2), 70.5)).await.unwrap();

        let raw = tokio::fs::read_to_string(store.root().join("measurements.csv"))
            .await
            .unwrap();
        assert_eq!(
            raw,
            "date,weight\n2024-03-01,71\n2024-03-02,70.5\n2024-03-03,70\n"
        );
    }

    #[tokio::test]
    async fn test_upsert_same_date_replaces() {
        let (_dir, store) = store();
        let first = store.upsert(None, Measurement::new(day(1), 71.0)).await.unwrap();
        let second = store.upsert(None, Measurement::new(day(1), 70.2)).await.unwrap();

        assert_eq!(first, UpsertOutcome::Inserted);
        assert_eq!(
            second,
            UpsertOutcome::Updated {
                previous_weight_kg: 71.0
            }
        );
        let log = store.load(None).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(day(1)).unwrap().weight_kg, 70.2);
    }

    #[tokio::test]
    async fn test_identities_are_isolated() {
        let (_dir, store) = store();
        let alice = Identity::new("alice").unwrap();
        let bob = Identity::new("bob").unwrap();

        store.upsert(Some(&alice), Measurement::new(day(1), 60.0)).await.unwrap();
        store.upsert(Some(&bob), Measurement::new(day(1), 90.0)).await.unwrap();

        assert_eq!(store.load(Some(&alice)).await.unwrap().weights(), vec![60.0]);
        assert_eq!(store.load(Some(&bob)).await.unwrap().weights(), vec![90.0]);
        assert!(store.load(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_rows_are_dropped() {
        let (_dir, store) = store();
        tokio::fs::write(
            store.root().join("measurements.csv"),
            "date,weight\n2024-03-02,70.5\n2024-03-01,oops\nnot-a-date,70\n2024-03-01,71\n",
        )
        .await
        .unwrap();

        let log = store.load(None).await.unwrap();
        assert_eq!(log.dates(), vec![day(1), day(2)]);
        assert_eq!(log.weights(), vec![71.0, 70.5]);
    }

    #[tokio::test]
    async fn test_row_with_invalid_bytes_is_dropped() {
        let (_dir, store) = store();
        tokio::fs::write(
            store.root().join("measurements.csv"),
            b"date,weight\n2024-03-01,70\n2024-03-02,\xff\n2024-03-03,69\n",
        )
        .await
        .unwrap();

        let log = store.load(None).await.unwrap();
        assert_eq!(log.weights(), vec![70.0, 69.0]);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let (_dir, store) = store();
        store.upsert(None, Measurement::new(day(1), 71.0)).await.unwrap();
        store.upsert(None, Measurement::new(day(2), 70.0)).await.unwrap();

        assert_eq!(store.clear(None).await.unwrap(), 2);
        assert!(store.load(None).await.unwrap().is_empty());
        assert_eq!(store.clear(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_profile_fields_upsert_per_key() {
        let (_dir, store) = store();
        let mut first = ProfileFields::new();
        first.insert("height_cm".into(), "180".into());
        first.insert("age".into(), "35".into());
        store.save_fields(None, &first).await.unwrap();

        let mut second = ProfileFields::new();
        second.insert("age".into(), "36".into());
        store.save_fields(None, &second).await.unwrap();

        let stored = store.get_fields(None).await.unwrap();
        assert_eq!(stored.get("height_cm").map(String::as_str), Some("180"));
        assert_eq!(stored.get("age").map(String::as_str), Some("36"));
    }

    #[tokio::test]
    async fn test_health_check_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileStore::new(dir.path().join("fresh"));
        store.health_check().await.unwrap();
        assert!(dir.path().join("fresh").is_dir());
    }
}
