//! Application state management
//!
//! Shared resources passed to all request handlers via Axum's state
//! extraction. Every field is behind an `Arc`, so cloning is cheap.

use crate::cache::TtlCache;
use crate::config::{AppConfig, StorageBackend, StorageConfig};
use crate::repositories::{FlatFileStore, MemoryStore, SheetStore, Store};
use crate::services::locks::PartitionLocks;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use weight_plan_shared::{MeasurementLog, ProfileFields};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    /// Stored profile fields per partition key
    pub profiles: Arc<TtlCache<String, ProfileFields>>,
    /// Measurement logs per partition key
    pub measurements: Arc<TtlCache<String, MeasurementLog>>,
    pub locks: Arc<PartitionLocks>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            profiles: Arc::new(TtlCache::new(config.cache.profile_ttl())),
            measurements: Arc::new(TtlCache::new(config.cache.measurements_ttl())),
            locks: Arc::new(PartitionLocks::new()),
            config: Arc::new(config),
        }
    }

    /// Build the state with the store selected in `config.storage`
    pub fn from_config(config: AppConfig) -> Self {
        let store = build_store(&config.storage);
        Self::new(store, config)
    }

    #[inline]
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Drop expired cache entries and locks of idle partitions
    pub async fn purge_idle(&self) -> usize {
        let removed = self.profiles.purge_expired().await
            + self.measurements.purge_expired().await
            + self.locks.prune_idle().await;
        if removed > 0 {
            debug!(removed, "Purged idle partition state");
        }
        removed
    }

    /// Run [`AppState::purge_idle`] every `period` until the task is aborted
    pub fn spawn_cleanup(&self, period: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                state.purge_idle().await;
            }
        })
    }
}

pub fn build_store(storage: &StorageConfig) -> Arc<dyn Store> {
    match storage.backend {
        StorageBackend::FlatFile => Arc::new(FlatFileStore::new(&storage.data_dir)),
        StorageBackend::Sheet => Arc::new(SheetStore::new(&storage.data_dir)),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    }
}
