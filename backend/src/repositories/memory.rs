//! In-process indexed store
//!
//! Measurements live in one ordered index keyed by (partition, date), so a
//! partition load is a range scan and an upsert is a point write.

use super::{partition_key, MeasurementStore, ProfileStore, Store, StoreResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use weight_plan_shared::{Identity, Measurement, MeasurementLog, ProfileFields, UpsertOutcome};

#[derive(Default)]
pub struct MemoryStore {
    measurements: RwLock<BTreeMap<(String, NaiveDate), f64>>,
    profiles: RwLock<HashMap<String, ProfileFields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn partition_range(user: &str) -> std::ops::RangeInclusive<(String, NaiveDate)> {
    (user.to_string(), NaiveDate::MIN)..=(user.to_string(), NaiveDate::MAX)
}

#[async_trait]
impl MeasurementStore for MemoryStore {
    async fn load(&self, identity: Option<&Identity>) -> StoreResult<MeasurementLog> {
        let index = self.measurements.read().await;
        let records = index
            .range(partition_range(partition_key(identity)))
            .map(|((_, date), weight)| Measurement::new(*date, *weight));
        Ok(MeasurementLog::from_records(records))
    }

    async fn upsert(
        &self,
        identity: Option<&Identity>,
        measurement: Measurement,
    ) -> StoreResult<UpsertOutcome> {
        let mut index = self.measurements.write().await;
        let key = (partition_key(identity).to_string(), measurement.date);
        Ok(match index.insert(key, measurement.weight_kg) {
            Some(previous_weight_kg) => UpsertOutcome::Updated { previous_weight_kg },
            None => UpsertOutcome::Inserted,
        })
    }

    async fn clear(&self, identity: Option<&Identity>) -> StoreResult<usize> {
        let mut index = self.measurements.write().await;
        let keys: Vec<_> = index
            .range(partition_range(partition_key(identity)))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &keys {
            index.remove(key);
        }
        Ok(keys.len())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_fields(&self, identity: Option<&Identity>) -> StoreResult<ProfileFields> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .get(partition_key(identity))
            .cloned()
            .unwrap_or_default())
    }

    async fn save_fields(
        &self,
        identity: Option<&Identity>,
        fields: &ProfileFields,
    ) -> StoreResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles
            .entry(partition_key(identity).to_string())
            .or_default()
            .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
