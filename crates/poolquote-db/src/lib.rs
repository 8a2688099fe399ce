//! # poolquote-db: Local Store for PoolQuote
//!
//! Durable local storage on SQLite (sqlx) plus the CSV/JSON exporters.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PoolQuote Data Flow                              │
//! │                                                                         │
//! │  Workspace (debounced persist) / CLI                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   poolquote-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│  (snapshot.rs) │    │  (embedded)  │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   export.rs: CSV + JSON renditions of a snapshot                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite: kv_store(key, value, updated_at)                       │   │
//! │  │  "inventoryData" → snapshot JSON    "adminConfig" → admin blob  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use poolquote_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("poolquote.db")).await?;
//! let snapshot = db.snapshots().load_inventory().await?.unwrap_or_default();
//! let pricing = db.snapshots().load_pricing().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod export;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::snapshot::{SnapshotRepository, ADMIN_CONFIG_KEY, INVENTORY_KEY};
