//! # Remote Document Store
//!
//! The push-subscribe store every collaborator writes the whole inventory
//! document to.
//!
//! ```text
//!  Workspace A                 RemoteStore                 Workspace B
//!  ───────────                 ───────────                 ───────────
//!  persist_remote(doc) ──────► latest = doc ──broadcast──► subscribe() rx
//!                              (last write wins)           └► merge_remote
//! ```
//!
//! Implementations:
//! - [`MemoryRemoteStore`]: in-process hub, for tests and single-machine use
//! - [`crate::transport::WsRemoteStore`]: WebSocket client of a relay

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use poolquote_core::snapshot::RemoteDocument;

/// Subscriber channel capacity. Slow subscribers skip to newer documents.
pub const SUBSCRIBER_CAPACITY: usize = 64;

/// A shared document store with change notifications.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Replaces the shared document.
    async fn persist_remote(&self, document: RemoteDocument) -> SyncResult<()>;

    /// The current document, if one has been written or received.
    async fn latest(&self) -> SyncResult<Option<RemoteDocument>>;

    /// Every document written from now on, including this client's own.
    fn subscribe(&self) -> broadcast::Receiver<RemoteDocument>;
}

// =============================================================================
// In-Process Store
// =============================================================================

/// In-process hub. Clones share the same document.
#[derive(Clone)]
pub struct MemoryRemoteStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    latest: RwLock<Option<RemoteDocument>>,
    changes: broadcast::Sender<RemoteDocument>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        MemoryRemoteStore {
            inner: Arc::new(MemoryInner {
                latest: RwLock::new(None),
                changes,
                fail_writes: AtomicBool::new(false),
                writes: AtomicUsize::new(0),
            }),
        }
    }

    /// Makes every following write fail, as if the network were down.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of accepted writes.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn persist_remote(&self, document: RemoteDocument) -> SyncResult<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::RemotePersistence("remote store unavailable".into()));
        }

        debug!(
            last_updated = document.last_updated,
            by = %document.last_updated_by,
            "Remote document written"
        );
        *self.inner.latest.write().await = Some(document.clone());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        // No subscribers is fine.
        let _ = self.inner.changes.send(document);
        Ok(())
    }

    async fn latest(&self) -> SyncResult<Option<RemoteDocument>> {
        Ok(self.inner.latest.read().await.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<RemoteDocument> {
        self.inner.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolquote_core::snapshot::InventorySnapshot;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_write_is_broadcast_and_kept() {
        let store = MemoryRemoteStore::new();
        let mut rx = store.subscribe();
        let doc = InventorySnapshot::default().to_remote(10, "van");

        store.persist_remote(doc.clone()).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), doc);
        assert_eq!(store.latest().await.unwrap(), Some(doc));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_writes_change_nothing() {
        let store = MemoryRemoteStore::new();
        store.set_fail_writes(true);

        let result = store
            .persist_remote(InventorySnapshot::default().to_remote(10, "van"))
            .await;

        assert!(matches!(result, Err(SyncError::RemotePersistence(_))));
        assert_eq!(store.latest().await.unwrap(), None);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_the_document() {
        let a = MemoryRemoteStore::new();
        let b = a.clone();
        a.persist_remote(InventorySnapshot::default().to_remote(1, "a"))
            .await
            .unwrap();
        assert_eq!(b.latest().await.unwrap().map(|d| d.last_updated), Some(1));
    }
}
