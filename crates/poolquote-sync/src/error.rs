//! # Sync Error Types
//!
//! Error types for the collaboration runtime.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  InvalidMessage         │ │
//! │  │  MissingCollab. │  │  Disconnected   │  │  SerializationFailed    │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Persistence    │  │     Ledger      │  │      Internal           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  LocalPersist.  │  │  Rejected       │  │  ChannelError           │ │
//! │  │  RemotePersist. │  │  (CoreError)    │  │  ShuttingDown           │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use poolquote_core::CoreError;
use poolquote_db::DbError;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    #[error("Collaborator ID not configured")]
    MissingCollaboratorId,

    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Disconnected from remote store")]
    Disconnected,

    #[error("Connection timeout after {0} seconds")]
    Timeout(u64),

    #[error("TLS error: {0}")]
    TlsError(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// Writing the remote document failed. The workspace falls back to an
    /// immediate local persist.
    #[error("Remote write failed: {0}")]
    RemotePersistence(String),

    /// Writing to the local store failed.
    #[error("Local save failed: {0}")]
    LocalPersistence(#[from] DbError),

    // =========================================================================
    // Ledger Errors
    // =========================================================================
    /// A command was rejected by the ledger. State is unchanged.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Workspace is shutting down")]
    ShuttingDown,

    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for SyncError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed => SyncError::Disconnected,
            WsError::AlreadyClosed => SyncError::Disconnected,
            WsError::Protocol(p) => SyncError::WebSocketError(p.to_string()),
            WsError::Io(io) => SyncError::ConnectionFailed(io.to_string()),
            WsError::Tls(tls) => SyncError::TlsError(tls.to_string()),
            other => SyncError::WebSocketError(other.to_string()),
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Errors shown to the user as a `PersistenceError` notice.
    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            SyncError::RemotePersistence(_) | SyncError::LocalPersistence(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_ledger_message() {
        let err = SyncError::from(CoreError::InvalidSectionOrIndex {
            section: "tools".into(),
            index: 9,
        });
        assert_eq!(err.to_string(), "No item at tools[9]");
    }

    #[test]
    fn test_persistence_classification() {
        assert!(SyncError::RemotePersistence("offline".into()).is_persistence_error());
        assert!(SyncError::from(DbError::PoolExhausted).is_persistence_error());
        assert!(!SyncError::Disconnected.is_persistence_error());
    }
}
