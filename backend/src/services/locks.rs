//! Per-partition write serialization
//!
//! Every mutation of a partition holds that partition's lock for its whole
//! read-modify-write cycle, so concurrent requests for one identity cannot
//! lose each other's updates. Different identities proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct PartitionLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PartitionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `partition`
    pub async fn acquire(&self, partition: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(partition.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Forget partitions nobody holds or waits on, returning how many
    pub async fn prune_idle(&self) -> usize {
        let mut locks = self.locks.lock().await;
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }
}
