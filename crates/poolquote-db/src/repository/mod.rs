//! # Repository Module
//!
//! Repository implementations over the local key-value table.
//!
//! ```text
//! Workspace (debounced persist)
//!      │  db.snapshots().save_inventory(&snapshot)
//!      ▼
//! SnapshotRepository
//!  ├── load_inventory / save_inventory   key "inventoryData"
//!  └── load_admin_config / save_admin    key "adminConfig"
//!      │
//!      ▼
//! kv_store (key, value JSON, updated_at)
//! ```
//!
//! ## Available Repositories
//!
//! - [`snapshot::SnapshotRepository`] - Inventory snapshot and admin config blob

pub mod snapshot;
