//! # Workspace
//!
//! Runtime owner of [`AppState`]. Every user action enters through
//! [`Workspace::dispatch`]; every remote document enters through the
//! listener task. Both take the same lock, so mutations are serialized.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Workspace                                      │
//! │                                                                         │
//! │  dispatch(cmd)                                                          │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  ┌──────────────────────┐   Err ──► warn! + Error notice ──► Rejected   │
//! │  │ AppState::apply (lock)│                                              │
//! │  └──────────┬───────────┘                                               │
//! │             │ Ok(change)                                                │
//! │             ├──► events.state_changed                                   │
//! │             │                                                           │
//! │   Inventory ├──► debouncer.poke ──(1s quiet)──► LocalStore::save_inventory
//! │             └──► outbox ──► pusher task ──► RemoteStore::persist_remote │
//! │                                  └─ Err ──► Warning notice + flush      │
//! │                                                                         │
//! │   Pricing   └──► LocalStore::save_pricing                               │
//! │                                                                         │
//! │  remote subscription ──► AppState::apply_remote (lock)                  │
//! │                             ├─ stale ──► skip                           │
//! │                             └─ applied ─► state_changed + poke          │
//! │                                   └─ healed ─► write back               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordered Pushes
//! Outgoing documents go through one queue drained by a single pusher task,
//! so the remote store sees them in stamp order. When several are queued
//! only the newest is written; each is a full copy of the state.
//!
//! ## Echo Suppression
//! A pushed document is stamped above the last applied remote stamp, and
//! the guard is advanced to that stamp before the push. When the document
//! comes back through the subscription it is not newer and is skipped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::debounce::{self, DebouncerHandle};
use crate::error::{SyncError, SyncResult};
use crate::events::{NoOpEvents, Notice, WorkspaceEvents};
use crate::local::LocalStore;
use crate::remote::RemoteStore;
use poolquote_core::command::{AppState, Change, Command};
use poolquote_core::merge::MergeTemplate;
use poolquote_core::payout::PayoutBreakdown;
use poolquote_core::quote::{Quote, Selection};
use poolquote_core::snapshot::{InventorySnapshot, RemoteDocument};

/// Default quiet period before a local save.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Outgoing queue capacity.
const OUTBOX_CAPACITY: usize = 64;

// =============================================================================
// Workspace
// =============================================================================

/// Cheap to clone; clones share the same state and tasks.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<WorkspaceInner>,
}

struct WorkspaceInner {
    state: Arc<Mutex<AppState>>,
    collaborator_id: String,
    local: Arc<dyn LocalStore>,
    remote: Option<Arc<dyn RemoteStore>>,
    events: Arc<dyn WorkspaceEvents>,
    persist: DebouncerHandle,
    /// Present when there is a remote store.
    outbox: Option<mpsc::Sender<Outgoing>>,
    template: MergeTemplate,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Loads the saved state, falling back to the built-in catalog on first run.
pub async fn load_state(local: &dyn LocalStore) -> SyncResult<AppState> {
    let snapshot = match local.load_inventory().await? {
        Some(snapshot) => snapshot,
        None => {
            info!("No saved inventory - starting from the default catalog");
            InventorySnapshot::from_template()
        }
    };
    let pricing = local.load_pricing().await?;
    Ok(AppState::new(snapshot, pricing))
}

/// Stamp for a document this collaborator writes: wall clock, but always
/// above the last applied remote stamp.
fn next_stamp(last_applied: Option<i64>) -> i64 {
    let now = Utc::now().timestamp_millis();
    match last_applied {
        Some(last) => now.max(last + 1),
        None => now,
    }
}

impl Workspace {
    pub fn builder(
        collaborator_id: impl Into<String>,
        local: Arc<dyn LocalStore>,
    ) -> WorkspaceBuilder {
        WorkspaceBuilder::new(collaborator_id, local)
    }

    pub fn collaborator_id(&self) -> &str {
        &self.inner.collaborator_id
    }

    /// Applies one user action.
    ///
    /// ## Errors
    /// `SyncError::Rejected` when the ledger refuses the command; the state
    /// is unchanged. Storage failures are reported as notices, not errors.
    pub async fn dispatch(&self, command: Command) -> SyncResult<Change> {
        let inner = &self.inner;

        let (change, outgoing, pricing) = {
            let mut state = inner.state.lock().await;
            let change = match state.apply(command) {
                Ok(change) => change,
                Err(e) => {
                    warn!(error = %e, "Command rejected");
                    inner.events.notice(&Notice::error(e.to_string()));
                    return Err(SyncError::Rejected(e));
                }
            };

            match change {
                Change::Inventory => (change, inner.stamp_outgoing(&mut state), None),
                Change::Pricing => (change, None, Some(state.pricing.clone())),
            }
        };

        inner.events.state_changed(change);

        match change {
            Change::Inventory => {
                inner.persist.poke().await?;
                if let Some(document) = outgoing {
                    self.push(document).await?;
                }
            }
            Change::Pricing => {
                if let Some(pricing) = pricing {
                    if let Err(e) = inner.local.save_pricing(&pricing).await {
                        warn!(error = %e, "Failed to save pricing configuration");
                        inner
                            .events
                            .notice(&Notice::error(format!("PersistenceError: {}", e)));
                    }
                }
            }
        }

        Ok(change)
    }

    /// Runs `f` against the current state.
    pub async fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let state = self.inner.state.lock().await;
        f(&state)
    }

    pub async fn snapshot(&self) -> InventorySnapshot {
        self.read(|state| state.snapshot.clone()).await
    }

    pub async fn quote(&self, selection: &Selection) -> SyncResult<(Quote, PayoutBreakdown)> {
        Ok(self.read(|state| state.quote(selection)).await?)
    }

    /// Saves the inventory now if an edit is waiting on the debounce.
    pub async fn persist_now(&self) -> SyncResult<()> {
        self.inner.persist.flush().await
    }

    /// Stops the remote listener, waits for queued remote writes and saves
    /// anything pending.
    pub async fn shutdown(&self) -> SyncResult<()> {
        info!("Shutting down workspace");
        for task in self.inner.tasks.lock().await.drain(..) {
            task.abort();
        }
        if let Some(outbox) = &self.inner.outbox {
            let (ack_tx, ack_rx) = oneshot::channel();
            outbox
                .send(Outgoing::Drain(ack_tx))
                .await
                .map_err(|_| SyncError::ChannelError("pusher stopped".into()))?;
            ack_rx
                .await
                .map_err(|_| SyncError::ChannelError("pusher dropped drain".into()))?;
        }
        self.inner.persist.flush().await
    }

    /// Queues a remote write without waiting for it.
    async fn push(&self, document: RemoteDocument) -> SyncResult<()> {
        let Some(outbox) = &self.inner.outbox else {
            return Ok(());
        };
        outbox
            .send(Outgoing::Document(document))
            .await
            .map_err(|_| SyncError::ChannelError("pusher stopped".into()))
    }

    /// Applies the remote document current at startup, then follows the
    /// subscription.
    async fn start(&self) -> SyncResult<()> {
        let Some(remote) = self.inner.remote.clone() else {
            return Ok(());
        };

        // Subscribe first so nothing written after `latest` is missed.
        let rx = remote.subscribe();
        match remote.latest().await {
            Ok(Some(document)) => self.receive(document).await?,
            Ok(None) => debug!("Remote store is empty"),
            Err(e) => warn!(error = %e, "Could not read remote document at startup"),
        }

        let workspace = self.clone();
        let listener = tokio::spawn(async move { workspace.listen(rx).await });
        self.inner.tasks.lock().await.push(listener);
        Ok(())
    }

    async fn listen(self, mut rx: broadcast::Receiver<RemoteDocument>) {
        loop {
            match rx.recv().await {
                Ok(document) => {
                    if let Err(e) = self.receive(document).await {
                        warn!(error = %e, "Failed to apply remote document");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Documents are whole-state; the next one supersedes these.
                    warn!(skipped, "Remote listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Remote subscription closed");
                    break;
                }
            }
        }
    }

    async fn receive(&self, document: RemoteDocument) -> SyncResult<()> {
        let inner = &self.inner;
        let write_back = {
            let mut state = inner.state.lock().await;
            let outcome = state.apply_remote(&document, &inner.template);
            if !outcome.applied {
                debug!(
                    last_updated = document.last_updated,
                    last_applied = ?state.last_applied_remote,
                    "Skipping stale remote document"
                );
                return Ok(());
            }

            info!(
                last_updated = document.last_updated,
                by = %document.last_updated_by,
                healed = outcome.healed_sections.len(),
                added_tools = outcome.added_tools.len(),
                backfilled = outcome.backfilled,
                "Applied remote document"
            );

            if outcome.needs_write_back {
                inner.stamp_outgoing(&mut state)
            } else {
                None
            }
        };

        inner.events.state_changed(Change::Inventory);
        inner.persist.poke().await?;
        if let Some(document) = write_back {
            debug!("Writing healed document back to remote");
            self.push(document).await?;
        }
        Ok(())
    }
}

impl WorkspaceInner {
    /// Builds the outgoing document and advances the guard past it.
    fn stamp_outgoing(&self, state: &mut AppState) -> Option<RemoteDocument> {
        self.remote.as_ref()?;
        let stamp = next_stamp(state.last_applied_remote);
        state.last_applied_remote = Some(stamp);
        Some(state.snapshot.to_remote(stamp, &self.collaborator_id))
    }
}

// =============================================================================
// Pusher
// =============================================================================

enum Outgoing {
    Document(RemoteDocument),
    /// Acknowledged once everything queued before it has been handled.
    Drain(oneshot::Sender<()>),
}

/// Spawns the single task that writes outgoing documents in order.
///
/// A failed write is not retried: the edit is saved locally right away
/// instead of waiting for the debounce. The task ends when every sender is
/// dropped.
fn spawn_pusher(
    remote: Arc<dyn RemoteStore>,
    events: Arc<dyn WorkspaceEvents>,
    persist: DebouncerHandle,
) -> mpsc::Sender<Outgoing> {
    let (tx, mut rx) = mpsc::channel::<Outgoing>(OUTBOX_CAPACITY);

    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let mut document = match message {
                Outgoing::Document(document) => document,
                Outgoing::Drain(ack) => {
                    let _ = ack.send(());
                    continue;
                }
            };

            // Skip to the newest queued document.
            let mut drains = Vec::new();
            while let Ok(next) = rx.try_recv() {
                match next {
                    Outgoing::Document(newer) => document = newer,
                    Outgoing::Drain(ack) => drains.push(ack),
                }
            }

            let stamp = document.last_updated;
            match remote.persist_remote(document).await {
                Ok(()) => debug!(last_updated = stamp, "Remote document written"),
                Err(e) => {
                    warn!(error = %e, "Remote write failed - saving locally");
                    events.notice(&Notice::warning(format!(
                        "PersistenceError: {}. Changes are saved on this device only.",
                        e
                    )));
                    if let Err(e) = persist.flush().await {
                        warn!(error = %e, "Fallback local save failed");
                    }
                }
            }

            for ack in drains {
                let _ = ack.send(());
            }
        }
        debug!("Pusher stopped");
    });

    tx
}

// =============================================================================
// Builder
// =============================================================================

pub struct WorkspaceBuilder {
    collaborator_id: String,
    local: Arc<dyn LocalStore>,
    remote: Option<Arc<dyn RemoteStore>>,
    events: Option<Arc<dyn WorkspaceEvents>>,
    debounce: Duration,
    template: Option<MergeTemplate>,
}

impl WorkspaceBuilder {
    pub fn new(collaborator_id: impl Into<String>, local: Arc<dyn LocalStore>) -> Self {
        WorkspaceBuilder {
            collaborator_id: collaborator_id.into(),
            local,
            remote: None,
            events: None,
            debounce: DEFAULT_DEBOUNCE,
            template: None,
        }
    }

    pub fn remote(mut self, remote: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn events(mut self, events: Arc<dyn WorkspaceEvents>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn template(mut self, template: MergeTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Loads saved state, spawns the debouncer and, with a remote, catches
    /// up and starts listening.
    pub async fn build(self) -> SyncResult<Workspace> {
        let state = Arc::new(Mutex::new(load_state(self.local.as_ref()).await?));
        let events = self.events.unwrap_or_else(|| Arc::new(NoOpEvents));

        // The debouncer stops by itself once every handle is dropped.
        let (persist, _debouncer) = {
            let state = state.clone();
            let local = self.local.clone();
            let events = events.clone();
            debounce::spawn(self.debounce, move || {
                let state = state.clone();
                let local = local.clone();
                let events = events.clone();
                async move {
                    let snapshot = state.lock().await.snapshot.clone();
                    match local.save_inventory(&snapshot).await {
                        Ok(()) => debug!("Inventory saved locally"),
                        Err(e) => {
                            warn!(error = %e, "Failed to save inventory");
                            events.notice(&Notice::error(format!("PersistenceError: {}", e)));
                        }
                    }
                }
            })
        };

        info!(
            collaborator_id = %self.collaborator_id,
            remote = self.remote.is_some(),
            debounce_ms = self.debounce.as_millis() as u64,
            "Workspace ready"
        );

        let outbox = self
            .remote
            .clone()
            .map(|remote| spawn_pusher(remote, events.clone(), persist.clone()));

        let workspace = Workspace {
            inner: Arc::new(WorkspaceInner {
                state,
                collaborator_id: self.collaborator_id,
                local: self.local,
                remote: self.remote,
                events,
                persist,
                outbox,
                template: self.template.unwrap_or_else(MergeTemplate::builtin),
                tasks: Mutex::new(Vec::new()),
            }),
        };
        workspace.start().await?;
        Ok(workspace)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoticeLevel;
    use crate::local::MemoryLocalStore;
    use crate::remote::MemoryRemoteStore;
    use poolquote_core::ledger::ItemTemplate;
    use poolquote_core::types::SectionName;
    use async_trait::async_trait;
    use poolquote_core::CoreError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingEvents {
        notices: StdMutex<Vec<Notice>>,
        changes: StdMutex<Vec<Change>>,
    }

    impl RecordingEvents {
        fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }
    }

    impl WorkspaceEvents for RecordingEvents {
        fn state_changed(&self, change: Change) {
            self.changes.lock().unwrap().push(change);
        }

        fn notice(&self, notice: &Notice) {
            self.notices.lock().unwrap().push(notice.clone());
        }
    }

    /// Remote store whose first write stalls, so a later write could
    /// overtake it if pushes were not ordered.
    struct SlowFirstWrite {
        store: MemoryRemoteStore,
        stalled: AtomicBool,
    }

    #[async_trait]
    impl RemoteStore for SlowFirstWrite {
        async fn persist_remote(&self, document: RemoteDocument) -> SyncResult<()> {
            if !self.stalled.swap(true, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            self.store.persist_remote(document).await
        }

        async fn latest(&self) -> SyncResult<Option<RemoteDocument>> {
            self.store.latest().await
        }

        fn subscribe(&self) -> broadcast::Receiver<RemoteDocument> {
            self.store.subscribe()
        }
    }

    fn add(name: &str) -> Command {
        Command::AddItem {
            section: SectionName::Hardware,
            template: ItemTemplate::named(name),
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    /// Polls `check` on real time until it holds or two seconds pass.
    async fn eventually<F, Fut>(mut check: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        for _ in 0..200 {
            if check().await {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[test]
    fn test_next_stamp_stays_above_last_applied() {
        let far_future = Utc::now().timestamp_millis() + 60_000;
        assert_eq!(next_stamp(Some(far_future)), far_future + 1);
        assert!(next_stamp(None) > 0);
    }

    #[tokio::test]
    async fn test_first_run_starts_from_template() {
        let local = MemoryLocalStore::new();
        let workspace = Workspace::builder("van", Arc::new(local))
            .build()
            .await
            .unwrap();
        assert_eq!(
            workspace.snapshot().await.sections,
            InventorySnapshot::from_template().sections
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_are_saved_once_after_quiet_period() {
        let local = MemoryLocalStore::new();
        let workspace = Workspace::builder("van", Arc::new(local.clone()))
            .build()
            .await
            .unwrap();

        workspace.dispatch(add("Hose clamp")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        workspace.dispatch(add("Teflon tape")).await.unwrap();
        settle().await;

        tokio::time::sleep(Duration::from_millis(900)).await;
        settle().await;
        assert_eq!(local.inventory_saves(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(local.inventory_saves(), 1);

        let saved = local.saved_inventory().await.unwrap();
        let names: Vec<_> = saved
            .sections
            .get(SectionName::Hardware)
            .iter()
            .map(|item| item.name.clone())
            .collect();
        assert!(names.contains(&"Hose clamp".to_string()));
        assert!(names.contains(&"Teflon tape".to_string()));
    }

    #[tokio::test]
    async fn test_rejected_command_leaves_state_and_notifies() {
        let events = Arc::new(RecordingEvents::default());
        let workspace = Workspace::builder("van", Arc::new(MemoryLocalStore::new()))
            .events(events.clone())
            .build()
            .await
            .unwrap();
        let before = workspace.snapshot().await;

        let result = workspace
            .dispatch(Command::CycleStatus {
                section: SectionName::Tools,
                index: 999,
            })
            .await;

        assert!(matches!(
            result,
            Err(SyncError::Rejected(CoreError::InvalidSectionOrIndex { .. }))
        ));
        assert_eq!(workspace.snapshot().await, before);
        let notices = events.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(events.changes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_saves_locally_at_once() {
        let local = MemoryLocalStore::new();
        let remote = MemoryRemoteStore::new();
        remote.set_fail_writes(true);
        let events = Arc::new(RecordingEvents::default());

        let workspace = Workspace::builder("van", Arc::new(local.clone()))
            .remote(Arc::new(remote.clone()))
            .events(events.clone())
            .debounce(Duration::from_secs(3600))
            .build()
            .await
            .unwrap();

        workspace.dispatch(add("Hose clamp")).await.unwrap();

        assert!(
            eventually(|| {
                let local = local.clone();
                async move { local.inventory_saves() == 1 }
            })
            .await
        );
        assert_eq!(remote.write_count(), 0);
        assert!(events
            .notices()
            .iter()
            .any(|n| n.level == NoticeLevel::Warning && n.message.starts_with("PersistenceError")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_quick_edits_reach_remote_in_order() {
        let store = MemoryRemoteStore::new();
        let remote = SlowFirstWrite {
            store: store.clone(),
            stalled: AtomicBool::new(false),
        };
        let workspace = Workspace::builder("van", Arc::new(MemoryLocalStore::new()))
            .remote(Arc::new(remote))
            .build()
            .await
            .unwrap();

        workspace.dispatch(add("First")).await.unwrap();
        workspace.dispatch(add("Second")).await.unwrap();
        workspace.shutdown().await.unwrap();

        let local = workspace.snapshot().await;
        let written = store.latest().await.unwrap().unwrap();
        assert_eq!(written.data.sections, local.sections);
        assert!(written
            .data
            .sections
            .get(SectionName::Hardware)
            .iter()
            .any(|item| item.name == "Second"));

        // Nothing late overwrites it.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.latest().await.unwrap().unwrap(), written);
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_queued_remote_writes() {
        let remote = MemoryRemoteStore::new();
        let workspace = Workspace::builder("van", Arc::new(MemoryLocalStore::new()))
            .remote(Arc::new(remote.clone()))
            .build()
            .await
            .unwrap();

        workspace.dispatch(add("Hose clamp")).await.unwrap();
        workspace.shutdown().await.unwrap();

        assert_eq!(remote.write_count(), 1);
    }

    #[tokio::test]
    async fn test_pricing_change_saved_immediately() {
        let local = MemoryLocalStore::new();
        let workspace = Workspace::builder("office", Arc::new(local.clone()))
            .build()
            .await
            .unwrap();

        let change = workspace
            .dispatch(Command::SetGlobalMargin(
                poolquote_core::types::Percent::from_whole(50),
            ))
            .await
            .unwrap();

        assert_eq!(change, Change::Pricing);
        assert_eq!(local.pricing_saves(), 1);
        assert_eq!(local.inventory_saves(), 0);
    }

    #[tokio::test]
    async fn test_own_echo_is_skipped() {
        let remote = MemoryRemoteStore::new();
        let events = Arc::new(RecordingEvents::default());
        let workspace = Workspace::builder("van", Arc::new(MemoryLocalStore::new()))
            .remote(Arc::new(remote.clone()))
            .events(events.clone())
            .build()
            .await
            .unwrap();

        workspace.dispatch(add("Hose clamp")).await.unwrap();
        assert!(
            eventually(|| {
                let remote = remote.clone();
                async move { remote.write_count() == 1 }
            })
            .await
        );
        settle().await;

        // One change from the dispatch, none from the echo.
        assert_eq!(events.changes.lock().unwrap().len(), 1);
        assert_eq!(remote.write_count(), 1);
    }

    #[tokio::test]
    async fn test_two_collaborators_converge() {
        let remote = MemoryRemoteStore::new();
        let van = Workspace::builder("van", Arc::new(MemoryLocalStore::new()))
            .remote(Arc::new(remote.clone()))
            .build()
            .await
            .unwrap();
        let office = Workspace::builder("office", Arc::new(MemoryLocalStore::new()))
            .remote(Arc::new(remote.clone()))
            .build()
            .await
            .unwrap();

        van.dispatch(add("Hose clamp")).await.unwrap();

        let has_clamp = |workspace: Workspace| async move {
            workspace
                .snapshot()
                .await
                .sections
                .get(SectionName::Hardware)
                .iter()
                .any(|item| item.name == "Hose clamp")
        };
        assert!(eventually(|| has_clamp(office.clone())).await);

        office
            .dispatch(Command::SetProjectNotes("Order more tape".into()))
            .await
            .unwrap();
        assert!(
            eventually(|| {
                let van = van.clone();
                async move { van.snapshot().await.project_notes == "Order more tape" }
            })
            .await
        );
        assert!(has_clamp(van.clone()).await);
    }

    #[tokio::test]
    async fn test_startup_applies_existing_remote_document() {
        let remote = MemoryRemoteStore::new();
        let mut shared = InventorySnapshot::from_template();
        shared.project_notes = "Written elsewhere".into();
        remote
            .persist_remote(shared.to_remote(Utc::now().timestamp_millis(), "office"))
            .await
            .unwrap();

        let workspace = Workspace::builder("van", Arc::new(MemoryLocalStore::new()))
            .remote(Arc::new(remote))
            .build()
            .await
            .unwrap();

        assert_eq!(workspace.snapshot().await.project_notes, "Written elsewhere");
        assert!(workspace.read(|s| s.last_applied_remote.is_some()).await);
    }
}
