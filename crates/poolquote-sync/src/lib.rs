//! # poolquote-sync: Collaboration Runtime for PoolQuote
//!
//! Owns the live [`AppState`](poolquote_core::AppState) and everything that
//! happens after an edit: debounced local persistence, the shared remote
//! document, and merging other collaborators' changes back in.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Workspace Architecture                           │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    Workspace (runtime owner)                     │  │
//! │  │                                                                  │  │
//! │  │  dispatch(Command) → AppState::apply → events + persistence      │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │   Debouncer    │  │  LocalStore    │  │  RemoteStore           │    │
//! │  │                │  │                │  │                        │    │
//! │  │ trailing edge  │  │ SQLite kv via  │  │ MemoryRemoteStore      │    │
//! │  │ 1 s quiet      │──►  poolquote-db  │  │ WsRemoteStore ──┐      │    │
//! │  └────────────────┘  └────────────────┘  └─────────────────┼──────┘    │
//! │                                                            │ ws        │
//! │                                           ┌────────────────▼───────┐   │
//! │                                           │ RelayServer (axum)     │   │
//! │                                           │ hosts the shared doc   │   │
//! │                                           └────────────────────────┘   │
//! │                                                                         │
//! │  EVENTS (to the front end via WorkspaceEvents):                        │
//! │  • state_changed(Change) - re-render                                   │
//! │  • notice(Notice)        - toast, auto-dismissed after 4 s             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`workspace`] - `Workspace` orchestrator and builder
//! - [`debounce`] - Trailing-edge debouncer task
//! - [`local`] - Local store trait over `poolquote-db`
//! - [`remote`] - Remote store trait and in-process hub
//! - [`transport`] - WebSocket client of a relay
//! - [`relay`] - WebSocket relay server
//! - [`protocol`] - Relay wire messages
//! - [`events`] - Notices and the event sink trait
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use poolquote_sync::{SyncConfig, Workspace, WsRemoteStore, TransportConfig};
//! use poolquote_db::{Database, DbConfig};
//!
//! let config = SyncConfig::load(None)?;
//! let db = Database::new(DbConfig::new(config.database_path())).await?;
//!
//! let mut builder = Workspace::builder(config.collaborator_id(), Arc::new(db.snapshots()))
//!     .debounce(config.debounce());
//! if config.remote.mode.is_enabled() {
//!     let remote = WsRemoteStore::spawn(TransportConfig::from_sync_config(&config)?);
//!     builder = builder.remote(Arc::new(remote));
//! }
//! let workspace = builder.build().await?;
//!
//! workspace.dispatch(Command::SetProjectNotes("Call supplier".into())).await?;
//! workspace.shutdown().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod local;
pub mod protocol;
pub mod relay;
pub mod remote;
pub mod transport;
pub mod workspace;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{RemoteMode, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use events::{NoOpEvents, Notice, NoticeLevel, WorkspaceEvents};
pub use local::{LocalStore, MemoryLocalStore};
pub use protocol::RemoteMessage;
pub use relay::{RelayHandle, RelayServer};
pub use remote::{MemoryRemoteStore, RemoteStore};
pub use transport::{ConnectionState, TransportConfig, WsRemoteStore};
pub use workspace::{Workspace, WorkspaceBuilder};
