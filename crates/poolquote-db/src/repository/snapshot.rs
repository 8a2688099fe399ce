//! # Snapshot Repository
//!
//! Stores the inventory snapshot and the admin config blob as JSON values in
//! the `kv_store` table.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save_inventory(&snapshot)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  stamp lastSaved = now  ──►  serde_json  ──►  UPSERT kv_store           │
//! │                                                 key = "inventoryData"   │
//! │                                                                         │
//! │  load_inventory()                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT value ──► InventorySnapshot::load (category backfill)           │
//! │       │                                                                 │
//! │       └── no row → Ok(None), caller starts from the template            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole snapshot is replaced on every save. Nothing is merged here.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use poolquote_core::pricing::{AdminConfigPatch, PricingConfiguration};
use poolquote_core::snapshot::InventorySnapshot;

/// Storage key of the inventory snapshot.
pub const INVENTORY_KEY: &str = "inventoryData";

/// Storage key of the admin pricing blob.
pub const ADMIN_CONFIG_KEY: &str = "adminConfig";

/// Repository for the two stored documents.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    // =========================================================================
    // Raw Values
    // =========================================================================

    /// Raw JSON stored under `key`, if any.
    pub async fn get_raw(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Replaces the value under `key`.
    pub async fn put_raw(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "Stored value");
        Ok(())
    }

    /// Removes the value under `key`. Returns whether a row existed.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> DbResult<()> {
        let json = serde_json::to_string(value)?;
        self.put_raw(key, &json).await
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| DbError::corrupt(key, e.to_string())),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Inventory Snapshot
    // =========================================================================

    /// Loads the stored snapshot, backfilling categories of legacy items.
    pub async fn load_inventory(&self) -> DbResult<Option<InventorySnapshot>> {
        let Some(json) = self.get_raw(INVENTORY_KEY).await? else {
            debug!("No stored inventory snapshot");
            return Ok(None);
        };

        let snapshot = InventorySnapshot::load(&json).map_err(|e| {
            warn!(error = %e, "Stored inventory snapshot is unreadable");
            DbError::corrupt(INVENTORY_KEY, e.to_string())
        })?;
        Ok(Some(snapshot))
    }

    /// Saves the snapshot, stamping `lastSaved`. Returns the stamp.
    pub async fn save_inventory(&self, snapshot: &InventorySnapshot) -> DbResult<DateTime<Utc>> {
        let saved_at = Utc::now();
        let stamped = InventorySnapshot {
            last_saved: Some(saved_at),
            ..snapshot.clone()
        };
        self.put_json(INVENTORY_KEY, &stamped).await?;

        debug!(items = snapshot.sections.len(), "Inventory snapshot saved");
        Ok(saved_at)
    }

    // =========================================================================
    // Admin Config
    // =========================================================================

    /// The stored admin blob, if any.
    pub async fn load_admin_config(&self) -> DbResult<Option<AdminConfigPatch>> {
        self.get_json(ADMIN_CONFIG_KEY).await
    }

    /// Stores the admin-editable subset of `config`.
    pub async fn save_admin_config(&self, config: &PricingConfiguration) -> DbResult<()> {
        self.put_json(ADMIN_CONFIG_KEY, &config.admin_export()).await
    }

    /// Defaults with the stored admin blob shallow-merged on top.
    pub async fn load_pricing(&self) -> DbResult<PricingConfiguration> {
        let mut pricing = PricingConfiguration::default();
        if let Some(patch) = self.load_admin_config().await? {
            pricing.apply_patch(patch);
        }
        Ok(pricing)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
