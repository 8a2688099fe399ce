//! # Application Context
//!
//! Everything a subcommand needs, opened once per invocation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppContext::open                                                       │
//! │                                                                         │
//! │  1. SyncConfig  ◄── poolquote.toml + POOLQUOTE_* env                    │
//! │  2. Database    ◄── SQLite file (WAL), migrations                       │
//! │  3. Relay       ◄── WsRemoteStore, only in websocket mode               │
//! │  4. Workspace   ◄── saved state, remote catch-up, debouncer             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use poolquote_core::command::Change;
use poolquote_db::{Database, DbConfig};
use poolquote_sync::{
    Notice, NoticeLevel, RemoteMode, RemoteStore, SyncConfig, TransportConfig, Workspace,
    WorkspaceEvents, WsRemoteStore,
};

/// Time given to the transport to send the last queued write before it closes.
const PUSH_GRACE: Duration = Duration::from_millis(250);

/// Global options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub offline: bool,
}

pub struct AppContext {
    pub config: SyncConfig,
    pub db: Database,
    pub workspace: Workspace,
    remote: Option<WsRemoteStore>,
}

impl AppContext {
    pub async fn open(options: &GlobalOptions) -> Result<Self> {
        let mut config = load_config(options)?;
        if options.offline {
            config.remote.mode = RemoteMode::Offline;
        }

        let db_path = options
            .database
            .clone()
            .unwrap_or_else(|| config.database_path());
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        info!(?db_path, "Opening local store");
        let db = Database::new(DbConfig::new(&db_path))
            .await
            .with_context(|| format!("opening database {}", db_path.display()))?;

        let remote = if config.remote.mode.is_enabled() {
            let store = WsRemoteStore::spawn(TransportConfig::from_sync_config(&config)?);
            wait_for_relay(&store, Duration::from_secs(config.remote.connect_timeout_secs)).await;
            Some(store)
        } else {
            None
        };

        let mut builder = Workspace::builder(config.collaborator_id(), Arc::new(db.snapshots()))
            .events(Arc::new(TerminalEvents))
            .debounce(config.debounce());
        if let Some(store) = &remote {
            builder = builder.remote(Arc::new(store.clone()));
        }
        let workspace = builder.build().await.context("starting workspace")?;

        Ok(AppContext {
            config,
            db,
            workspace,
            remote,
        })
    }

    /// Hands queued writes to the relay, saves pending edits and disconnects.
    pub async fn close(self) -> Result<()> {
        self.workspace.shutdown().await?;
        if let Some(remote) = &self.remote {
            tokio::time::sleep(PUSH_GRACE).await;
            let _ = remote.shutdown().await;
        }
        self.db.close().await;
        Ok(())
    }
}

pub fn load_config(options: &GlobalOptions) -> Result<SyncConfig> {
    SyncConfig::load(options.config.clone()).context("loading configuration")
}

/// Waits for the connection and the relay's current document.
async fn wait_for_relay(store: &WsRemoteStore, limit: Duration) {
    let waited = tokio::time::timeout(limit, async {
        while !store.is_connected().await {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        // An empty relay never sends a document; don't wait long for one.
        for _ in 0..10 {
            if matches!(store.latest().await, Ok(Some(_))) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    if waited.is_err() {
        warn!("Relay unreachable - working offline for this run");
    }
}

// =============================================================================
// Terminal Events
// =============================================================================

/// Prints notices to stderr and logs state changes.
struct TerminalEvents;

impl WorkspaceEvents for TerminalEvents {
    fn state_changed(&self, change: Change) {
        debug!(?change, "State changed");
    }

    fn notice(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Error => error!(message = %notice.message, "Notice"),
            NoticeLevel::Warning => warn!(message = %notice.message, "Notice"),
            NoticeLevel::Info | NoticeLevel::Success => {
                info!(message = %notice.message, "Notice")
            }
        }
        eprintln!("[{:?}] {}", notice.level, notice.message);
    }
}
