//! # Trailing-Edge Debouncer
//!
//! Coalesces bursts of inventory edits into a single local save.
//!
//! ```text
//!  poke ──┐  poke ──┐  poke ──┐
//!         ▼         ▼         ▼
//!  ───────●─────────●─────────●───────────────────■──────►  time
//!                             └──── delay ────────┘
//!                                                 action()
//! ```
//!
//! Each poke pushes the deadline out by `delay`. `flush` runs a pending
//! action immediately and waits for it. Dropping every handle also flushes.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::error::{SyncError, SyncResult};

enum DebounceCommand {
    Poke,
    Flush(oneshot::Sender<()>),
}

/// Cloneable handle to a running debouncer.
#[derive(Clone)]
pub struct DebouncerHandle {
    tx: mpsc::Sender<DebounceCommand>,
}

impl DebouncerHandle {
    /// Schedules the action `delay` from now, replacing any earlier schedule.
    pub async fn poke(&self) -> SyncResult<()> {
        self.tx
            .send(DebounceCommand::Poke)
            .await
            .map_err(|_| SyncError::ChannelError("debouncer stopped".into()))
    }

    /// Runs the pending action now, if any, and waits for it to finish.
    pub async fn flush(&self) -> SyncResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(DebounceCommand::Flush(ack_tx))
            .await
            .map_err(|_| SyncError::ChannelError("debouncer stopped".into()))?;
        ack_rx
            .await
            .map_err(|_| SyncError::ChannelError("debouncer dropped flush".into()))
    }
}

/// Spawns the debouncer task.
pub fn spawn<F, Fut>(delay: Duration, action: F) -> (DebouncerHandle, JoinHandle<()>)
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<DebounceCommand>(64);

    let task = tokio::spawn(async move {
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(DebounceCommand::Poke) => {
                        deadline = Some(Instant::now() + delay);
                    }
                    Some(DebounceCommand::Flush(ack)) => {
                        if deadline.take().is_some() {
                            debug!("Debounce flushed early");
                            action().await;
                        }
                        let _ = ack.send(());
                    }
                    None => {
                        if deadline.take().is_some() {
                            action().await;
                        }
                        break;
                    }
                },

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    action().await;
                }
            }
        }
    });

    (DebouncerHandle { tx }, task)
}
