//! # Relay Server
//!
//! Hosts the shared inventory document for collaborators connecting over
//! WebSocket. The relay is a dumb store: it keeps the last document written
//! and fans every write out to all subscribers. Freshness and merging are
//! decided by each client.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Relay Server                                   │
//! │                                                                         │
//! │   GET /health → "OK"                                                   │
//! │   GET /ws     → WebSocket upgrade                                      │
//! │                                                                         │
//! │   client A ──Subscribe──►  ┌──────────────┐                            │
//! │            ◄──Document───  │ latest: doc  │  (sent on subscribe)       │
//! │                            │              │                            │
//! │   client B ──Put(doc)────► │ latest = doc │──broadcast──► A, B         │
//! │                            └──────────────┘   Document(doc)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::config::RelaySettings;
use crate::error::{SyncError, SyncResult};
use crate::protocol::RemoteMessage;
use crate::remote::SUBSCRIBER_CAPACITY;
use poolquote_core::snapshot::RemoteDocument;

/// Ping interval to keep connections alive.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Maximum message size (8MB). Documents with receipt photos are large.
const MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;

/// Time a client gets to send `Subscribe`.
const SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Relay State
// =============================================================================

struct RelayState {
    latest: RwLock<Option<RemoteDocument>>,
    broadcast_tx: broadcast::Sender<RemoteDocument>,
    subscribers: RwLock<usize>,
}

impl RelayState {
    fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        RelayState {
            latest: RwLock::new(None),
            broadcast_tx,
            subscribers: RwLock::new(0),
        }
    }

    async fn put(&self, doc: RemoteDocument) {
        info!(
            last_updated = doc.last_updated,
            by = %doc.last_updated_by,
            "Document replaced"
        );
        *self.latest.write().await = Some(doc.clone());
        let _ = self.broadcast_tx.send(doc);
    }
}

// =============================================================================
// Relay Server
// =============================================================================

/// Handle for a running relay.
#[derive(Clone)]
pub struct RelayHandle {
    state: Arc<RelayState>,
    local_addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
}

impl RelayHandle {
    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `ws://` URL clients should connect to.
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.local_addr)
    }

    pub async fn latest(&self) -> Option<RemoteDocument> {
        self.state.latest.read().await.clone()
    }

    pub async fn subscriber_count(&self) -> usize {
        *self.state.subscribers.read().await
    }

    pub async fn shutdown(&self) -> SyncResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SyncError::ChannelError("Relay shutdown channel closed".into()))
    }
}

pub struct RelayServer {
    settings: RelaySettings,
}

impl RelayServer {
    pub fn new(settings: RelaySettings) -> Self {
        RelayServer { settings }
    }

    /// Binds and serves in a background task.
    pub async fn start(self) -> SyncResult<RelayHandle> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let state = Arc::new(RelayState::new());

        let app = Router::new()
            .route("/ws", get(ws_handler))
            .route("/health", get(health_handler))
            .with_state(state.clone());

        let bind_addr = self.settings.bind_address();
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            SyncError::ConnectionFailed(format!("Failed to bind to {}: {}", bind_addr, e))
        })?;
        let local_addr = listener.local_addr()?;

        info!(addr = %local_addr, "Relay server started");

        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_rx.recv().await;
                    info!("Relay server shutting down");
                })
                .await;
            if let Err(e) = served {
                warn!(error = %e, "Relay server stopped with error");
            }
        });

        Ok(RelayHandle {
            state,
            local_addr,
            shutdown_tx,
        })
    }
}

// =============================================================================
// WebSocket Handler
// =============================================================================

async fn health_handler() -> impl IntoResponse {
    "OK"
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    ws.max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<RelayState>) {
    let (mut sender, mut receiver) = socket.split();

    let collaborator_id =
        match tokio::time::timeout(SUBSCRIBE_TIMEOUT, receive_subscribe(&mut receiver)).await {
            Ok(Ok(id)) => id,
            Ok(Err(e)) => {
                warn!(error = %e, "Bad subscribe - closing connection");
                let reject = RemoteMessage::Error {
                    code: "SUBSCRIBE_REQUIRED".to_string(),
                    message: e.to_string(),
                };
                let _ = send_message(&mut sender, &reject).await;
                return;
            }
            Err(_) => {
                warn!("No subscribe within timeout - closing connection");
                return;
            }
        };

    info!(collaborator_id = %collaborator_id, "Collaborator subscribed");
    *state.subscribers.write().await += 1;

    // Subscribe before reading latest so no write falls in between.
    let mut broadcast_rx = state.broadcast_tx.subscribe();
    let current = state.latest.read().await.clone();
    if let Some(doc) = current {
        if let Err(e) = send_message(&mut sender, &RemoteMessage::Document(doc)).await {
            warn!(collaborator_id = %collaborator_id, error = %e, "Failed to send document");
            *state.subscribers.write().await -= 1;
            return;
        }
    }

    let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Message>(64);

    let outgoing_handle = tokio::spawn(async move {
        while let Some(msg) = outgoing_rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let forward_tx = outgoing_tx.clone();
    let forward_id = collaborator_id.clone();
    let broadcast_handle = tokio::spawn(async move {
        loop {
            match broadcast_rx.recv().await {
                Ok(doc) => {
                    let Ok(json) = RemoteMessage::Document(doc).to_json() else {
                        continue;
                    };
                    if forward_tx.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(collaborator_id = %forward_id, skipped, "Subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let ping_tx = outgoing_tx.clone();
    let ping_handle = tokio::spawn(async move {
        let mut ping_interval = interval(PING_INTERVAL);
        loop {
            ping_interval.tick().await;
            if ping_tx
                .send(Message::Ping(Default::default()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match RemoteMessage::from_json(text.as_str()) {
                Ok(RemoteMessage::Put(doc)) => state.put(doc).await,
                Ok(other) => {
                    debug!(
                        collaborator_id = %collaborator_id,
                        msg_type = %other.type_name(),
                        "Ignoring message"
                    );
                }
                Err(e) => {
                    debug!(collaborator_id = %collaborator_id, error = %e, "Invalid message");
                    let reply = RemoteMessage::Error {
                        code: "INVALID_MESSAGE".to_string(),
                        message: e.to_string(),
                    };
                    if let Ok(json) = reply.to_json() {
                        let _ = outgoing_tx.send(Message::Text(json.into())).await;
                    }
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!(collaborator_id = %collaborator_id, "Collaborator disconnected");
    *state.subscribers.write().await -= 1;
    broadcast_handle.abort();
    ping_handle.abort();
    drop(outgoing_tx);
    outgoing_handle.abort();
}

/// Waits for the first text message and requires it to be `Subscribe`.
async fn receive_subscribe(receiver: &mut SplitStream<WebSocket>) -> SyncResult<String> {
    while let Some(msg) = receiver.next().await {
        match msg.map_err(|e| SyncError::WebSocketError(e.to_string()))? {
            Message::Text(text) => {
                return match RemoteMessage::from_json(text.as_str())? {
                    RemoteMessage::Subscribe { collaborator_id } => Ok(collaborator_id),
                    other => Err(SyncError::InvalidMessage(format!(
                        "expected Subscribe, got {}",
                        other.type_name()
                    ))),
                };
            }
            Message::Close(_) => return Err(SyncError::Disconnected),
            _ => continue,
        }
    }
    Err(SyncError::Disconnected)
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &RemoteMessage,
) -> SyncResult<()> {
    let json = msg.to_json()?;
    sender
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| SyncError::WebSocketError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolquote_core::snapshot::InventorySnapshot;
    use pretty_assertions::assert_eq;

    fn loopback() -> RelaySettings {
        RelaySettings {
            port: 0,
            bind_addr: "127.0.0.1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_start_binds_ephemeral_port() {
        let relay = RelayServer::new(loopback()).start().await.unwrap();
        assert_ne!(relay.local_addr().port(), 0);
        assert!(relay.ws_url().ends_with("/ws"));
        assert_eq!(relay.subscriber_count().await, 0);
        relay.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_put_replaces_latest() {
        let state = RelayState::new();
        let mut rx = state.broadcast_tx.subscribe();

        state
            .put(InventorySnapshot::default().to_remote(5, "a"))
            .await;
        state
            .put(InventorySnapshot::default().to_remote(3, "b"))
            .await;

        // Last write wins even with an older stamp; clients apply the guard.
        let latest = state.latest.read().await.clone().unwrap();
        assert_eq!(latest.last_updated_by, "b");
        assert_eq!(rx.recv().await.unwrap().last_updated, 5);
        assert_eq!(rx.recv().await.unwrap().last_updated, 3);
    }
}
