//! # WebSocket Remote Store
//!
//! [`RemoteStore`] backed by a relay, with automatic reconnection.
//!
//! ## Connection Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    WebSocket Connection States                          │
//! │                                                                         │
//! │  ┌────────────┐    connect()    ┌────────────┐                         │
//! │  │Disconnected│ ──────────────► │ Connecting │                         │
//! │  └────────────┘                 └─────┬──────┘                         │
//! │        ▲                    success   │   failure                       │
//! │        │                        ┌─────┴─────┐                          │
//! │        │                        ▼           ▼                           │
//! │        │              ┌────────────┐  ┌────────────┐                   │
//! │        │              │ Connected  │  │ Backoff    │                   │
//! │        │              │ Subscribe→ │  └─────┬──────┘                   │
//! │        │              └─────┬──────┘        │ timer expired            │
//! │        │            disconnect/error        │                           │
//! │        │                    ▼               │                           │
//! │        │              ┌────────────┐        │                           │
//! │        └───────────── │Reconnecting│ ◄──────┘                          │
//! │                       └────────────┘                                    │
//! │                                                                         │
//! │  BACKOFF: exponential with jitter, 500 ms doubling up to 60 s          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes are accepted only while connected. A write while disconnected
//! fails at once with `RemotePersistence`; nothing is queued or retried.

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::protocol::RemoteMessage;
use crate::remote::{RemoteStore, SUBSCRIBER_CAPACITY};
use poolquote_core::snapshot::RemoteDocument;

// =============================================================================
// Connection State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Waiting before the next attempt.
    Backoff,
    Reconnecting,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Backoff => write!(f, "backoff"),
            ConnectionState::Reconnecting => write!(f, "reconnecting"),
        }
    }
}

// =============================================================================
// Transport Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Relay URL, e.g. `ws://192.168.1.20:8765/ws`.
    pub url: String,

    /// Sent in `Subscribe`.
    pub collaborator_id: String,

    pub connect_timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,

    /// Maximum reconnection attempts (0 = infinite).
    pub max_retries: u32,

    /// Keepalive ping interval.
    pub ping_interval: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            url: String::new(),
            collaborator_id: String::new(),
            connect_timeout: Duration::from_secs(10),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
            max_retries: 0,
            ping_interval: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Transport settings from a validated config.
    pub fn from_sync_config(config: &SyncConfig) -> SyncResult<Self> {
        let url = config
            .remote
            .url
            .clone()
            .ok_or_else(|| SyncError::InvalidConfig("websocket mode needs remote.url".into()))?;

        Ok(TransportConfig {
            url,
            collaborator_id: config.collaborator_id().to_string(),
            connect_timeout: Duration::from_secs(config.remote.connect_timeout_secs),
            initial_backoff: Duration::from_millis(config.remote.initial_backoff_ms),
            max_backoff: Duration::from_secs(config.remote.max_backoff_secs),
            max_retries: config.remote.max_retries,
            ..TransportConfig::default()
        })
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Client handle. Cheap to clone; all clones share one connection.
#[derive(Clone)]
pub struct WsRemoteStore {
    outgoing_tx: mpsc::Sender<RemoteMessage>,
    state: Arc<RwLock<ConnectionState>>,
    latest: Arc<RwLock<Option<RemoteDocument>>>,
    documents: broadcast::Sender<RemoteDocument>,
    shutdown_tx: mpsc::Sender<()>,
}

impl WsRemoteStore {
    /// Spawns the connection task and returns its handle.
    pub fn spawn(config: TransportConfig) -> Self {
        let (outgoing_tx, outgoing_rx) = mpsc::channel::<RemoteMessage>(100);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let (documents, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        let state = Arc::new(RwLock::new(ConnectionState::Disconnected));
        let latest = Arc::new(RwLock::new(None));

        let transport = Transport {
            config,
            state: state.clone(),
            latest: latest.clone(),
            documents: documents.clone(),
            outgoing_rx,
            shutdown_rx,
        };
        tokio::spawn(transport.run());

        WsRemoteStore {
            outgoing_tx,
            state,
            latest,
            documents,
            shutdown_tx,
        }
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn is_connected(&self) -> bool {
        *self.state.read().await == ConnectionState::Connected
    }

    /// Closes the connection and stops reconnecting.
    pub async fn shutdown(&self) -> SyncResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SyncError::ChannelError("Failed to send shutdown signal".into()))
    }
}

#[async_trait]
impl RemoteStore for WsRemoteStore {
    async fn persist_remote(&self, document: RemoteDocument) -> SyncResult<()> {
        if !self.is_connected().await {
            return Err(SyncError::RemotePersistence(format!(
                "relay is {}",
                self.state().await
            )));
        }
        self.outgoing_tx
            .send(RemoteMessage::Put(document))
            .await
            .map_err(|_| SyncError::RemotePersistence("transport stopped".into()))
    }

    async fn latest(&self) -> SyncResult<Option<RemoteDocument>> {
        Ok(self.latest.read().await.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<RemoteDocument> {
        self.documents.subscribe()
    }
}

// =============================================================================
// Connection Task
// =============================================================================

struct Transport {
    config: TransportConfig,
    state: Arc<RwLock<ConnectionState>>,
    latest: Arc<RwLock<Option<RemoteDocument>>>,
    documents: broadcast::Sender<RemoteDocument>,
    outgoing_rx: mpsc::Receiver<RemoteMessage>,
    shutdown_rx: mpsc::Receiver<()>,
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

impl Transport {
    async fn run(mut self) {
        info!(url = %self.config.url, "Remote transport starting");

        let mut backoff = self.create_backoff();
        let mut retry_count = 0u32;

        loop {
            if self.shutdown_rx.try_recv().is_ok() {
                info!("Transport received shutdown signal");
                break;
            }

            *self.state.write().await = ConnectionState::Connecting;

            match self.connect_with_timeout().await {
                Ok(ws_stream) => {
                    info!("Connected to relay");
                    backoff.reset();
                    retry_count = 0;

                    match self.connection_loop(ws_stream).await {
                        Ok(Exit::Shutdown) => break,
                        Ok(Exit::Closed) => info!("Relay closed the connection"),
                        Err(e) => warn!(error = %e, "Connection loop ended"),
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to connect to relay");
                }
            }

            *self.state.write().await = ConnectionState::Backoff;

            if self.config.max_retries > 0 {
                retry_count += 1;
                if retry_count >= self.config.max_retries {
                    error!(
                        max_retries = self.config.max_retries,
                        "Max reconnection attempts reached"
                    );
                    break;
                }
            }

            let Some(duration) = backoff.next_backoff() else {
                error!("Backoff exhausted");
                break;
            };
            debug!(?duration, attempt = retry_count, "Waiting before reconnect");

            tokio::select! {
                _ = tokio::time::sleep(duration) => {
                    *self.state.write().await = ConnectionState::Reconnecting;
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Shutdown during backoff");
                    break;
                }
            }
        }

        *self.state.write().await = ConnectionState::Disconnected;
        info!("Remote transport stopped");
    }

    async fn connect_with_timeout(&self) -> SyncResult<WsStream> {
        match timeout(self.config.connect_timeout, connect_async(&self.config.url)).await {
            Ok(Ok((ws_stream, response))) => {
                debug!(status = ?response.status(), "WebSocket handshake complete");
                Ok(ws_stream)
            }
            Ok(Err(e)) => Err(SyncError::from(e)),
            Err(_) => Err(SyncError::Timeout(self.config.connect_timeout.as_secs())),
        }
    }

    /// Subscribes, then pumps messages until the socket closes or shutdown.
    async fn connection_loop(&mut self, ws_stream: WsStream) -> SyncResult<Exit> {
        let (mut write, mut read) = ws_stream.split();

        let subscribe = RemoteMessage::Subscribe {
            collaborator_id: self.config.collaborator_id.clone(),
        };
        write.send(WsMessage::Text(subscribe.to_json()?.into())).await?;
        *self.state.write().await = ConnectionState::Connected;

        let mut ping_interval = tokio::time::interval(self.config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                Some(msg) = self.outgoing_rx.recv() => {
                    debug!(msg_type = %msg.type_name(), "Sending message");
                    write.send(WsMessage::Text(msg.to_json()?.into())).await?;
                }

                incoming = read.next() => {
                    match incoming {
                        Some(Ok(WsMessage::Text(text))) => self.handle_text(text.as_str()).await,
                        Some(Ok(WsMessage::Ping(data))) => {
                            write.send(WsMessage::Pong(data)).await?;
                        }
                        Some(Ok(WsMessage::Close(frame))) => {
                            info!(?frame, "Received close frame");
                            return Ok(Exit::Closed);
                        }
                        Some(Ok(WsMessage::Binary(_))) => {
                            warn!("Received unexpected binary message");
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            return Err(SyncError::from(e));
                        }
                        None => return Ok(Exit::Closed),
                    }
                }

                _ = ping_interval.tick() => {
                    write.send(WsMessage::Ping(Default::default())).await?;
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Shutdown signal received, closing connection");
                    let _ = write.send(WsMessage::Close(None)).await;
                    return Ok(Exit::Shutdown);
                }
            }
        }
    }

    async fn handle_text(&self, text: &str) {
        match RemoteMessage::from_json(text) {
            Ok(RemoteMessage::Document(doc)) => {
                debug!(
                    last_updated = doc.last_updated,
                    by = %doc.last_updated_by,
                    "Received remote document"
                );
                *self.latest.write().await = Some(doc.clone());
                let _ = self.documents.send(doc);
            }
            Ok(RemoteMessage::Error { code, message }) => {
                warn!(code = %code, message = %message, "Relay reported an error");
            }
            Ok(other) => {
                debug!(msg_type = %other.type_name(), "Ignoring unexpected message");
            }
            Err(e) => warn!(error = %e, "Failed to parse message"),
        }
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.config.initial_backoff,
            max_interval: self.config.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// How a connection ended without error.
enum Exit {
    Closed,
    Shutdown,
}
