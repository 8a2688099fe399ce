//! # Local Store
//!
//! Durable per-device storage the workspace writes through. The production
//! implementation is the SQLite key-value store in `poolquote-db`.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{SyncError, SyncResult};
use poolquote_core::pricing::PricingConfiguration;
use poolquote_core::snapshot::InventorySnapshot;
use poolquote_db::{DbError, SnapshotRepository};

#[async_trait]
pub trait LocalStore: Send + Sync {
    /// The saved inventory, or `None` on first run.
    async fn load_inventory(&self) -> SyncResult<Option<InventorySnapshot>>;

    /// Defaults with the saved admin blob applied.
    async fn load_pricing(&self) -> SyncResult<PricingConfiguration>;

    async fn save_inventory(&self, snapshot: &InventorySnapshot) -> SyncResult<()>;

    async fn save_pricing(&self, pricing: &PricingConfiguration) -> SyncResult<()>;
}

#[async_trait]
impl LocalStore for SnapshotRepository {
    async fn load_inventory(&self) -> SyncResult<Option<InventorySnapshot>> {
        Ok(SnapshotRepository::load_inventory(self).await?)
    }

    async fn load_pricing(&self) -> SyncResult<PricingConfiguration> {
        Ok(SnapshotRepository::load_pricing(self).await?)
    }

    async fn save_inventory(&self, snapshot: &InventorySnapshot) -> SyncResult<()> {
        SnapshotRepository::save_inventory(self, snapshot).await?;
        Ok(())
    }

    async fn save_pricing(&self, pricing: &PricingConfiguration) -> SyncResult<()> {
        Ok(self.save_admin_config(pricing).await?)
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Keeps the last saved values in memory. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryLocalStore {
    inner: Arc<MemoryLocalInner>,
}

#[derive(Default)]
struct MemoryLocalInner {
    inventory: RwLock<Option<InventorySnapshot>>,
    pricing: RwLock<Option<PricingConfiguration>>,
    inventory_saves: AtomicUsize,
    pricing_saves: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing snapshot, as if saved by an earlier session.
    pub fn with_inventory(snapshot: InventorySnapshot) -> Self {
        let store = Self::default();
        if let Ok(mut slot) = store.inner.inventory.try_write() {
            *slot = Some(snapshot);
        }
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn inventory_saves(&self) -> usize {
        self.inner.inventory_saves.load(Ordering::SeqCst)
    }

    pub fn pricing_saves(&self) -> usize {
        self.inner.pricing_saves.load(Ordering::SeqCst)
    }

    pub async fn saved_inventory(&self) -> Option<InventorySnapshot> {
        self.inner.inventory.read().await.clone()
    }

    pub async fn saved_pricing(&self) -> Option<PricingConfiguration> {
        self.inner.pricing.read().await.clone()
    }

    fn check_writable(&self) -> SyncResult<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::LocalPersistence(DbError::QueryFailed(
                "disk full".into(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn load_inventory(&self) -> SyncResult<Option<InventorySnapshot>> {
        Ok(self.inner.inventory.read().await.clone())
    }

    async fn load_pricing(&self) -> SyncResult<PricingConfiguration> {
        Ok(self.inner.pricing.read().await.clone().unwrap_or_default())
    }

    async fn save_inventory(&self, snapshot: &InventorySnapshot) -> SyncResult<()> {
        self.check_writable()?;
        *self.inner.inventory.write().await = Some(snapshot.clone());
        self.inner.inventory_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn save_pricing(&self, pricing: &PricingConfiguration) -> SyncResult<()> {
        self.check_writable()?;
        *self.inner.pricing.write().await = Some(pricing.clone());
        self.inner.pricing_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolquote_db::{Database, DbConfig};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_sqlite_store_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store: Arc<dyn LocalStore> = Arc::new(db.snapshots());

        assert!(store.load_inventory().await.unwrap().is_none());

        let snapshot = InventorySnapshot::from_template();
        store.save_inventory(&snapshot).await.unwrap();
        let loaded = store.load_inventory().await.unwrap().unwrap();
        assert_eq!(loaded.sections, snapshot.sections);
        assert!(loaded.last_saved.is_some());
    }

    #[tokio::test]
    async fn test_memory_store_failure_is_local_persistence() {
        let store = MemoryLocalStore::new();
        store.set_fail_writes(true);

        let err = store
            .save_inventory(&InventorySnapshot::default())
            .await
            .unwrap_err();

        assert!(err.is_persistence_error());
        assert_eq!(store.inventory_saves(), 0);
        assert!(store.saved_inventory().await.is_none());
    }
}
