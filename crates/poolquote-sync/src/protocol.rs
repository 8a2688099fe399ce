//! # Relay Protocol Messages
//!
//! Messages exchanged between a collaborator and the relay that hosts the
//! shared document.
//!
//! ## Protocol Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Relay Protocol                                    │
//! │                                                                         │
//! │  SUBSCRIBE                                                             │
//! │  ─────────                                                             │
//! │  client ───► Subscribe { collaboratorId }                              │
//! │  relay  ◄─── Document { ... }     (current document, if any)           │
//! │                                                                         │
//! │  WRITE                                                                 │
//! │  ─────                                                                 │
//! │  client ───► Put { data, lastUpdated, lastUpdatedBy, version }         │
//! │  relay  ───► Document { ... }     (to every subscriber, writer too)    │
//! │                                                                         │
//! │  ERROR                                                                 │
//! │  ─────                                                                 │
//! │  relay  ───► Error { code, message }                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Adjacently tagged JSON:
//! ```json
//! { "type": "Put", "payload": { "data": { ... }, "lastUpdated": 1717243200000, ... } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use poolquote_core::snapshot::RemoteDocument;

/// All relay protocol messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum RemoteMessage {
    /// First message from a client after connecting.
    Subscribe {
        #[serde(rename = "collaboratorId")]
        collaborator_id: String,
    },

    /// Replace the shared document.
    Put(RemoteDocument),

    /// The shared document, sent on subscribe and after every write.
    Document(RemoteDocument),

    Error { code: String, message: String },
}

impl RemoteMessage {
    pub fn to_json(&self) -> SyncResult<String> {
        serde_json::to_string(self).map_err(SyncError::from)
    }

    pub fn from_json(json: &str) -> SyncResult<Self> {
        serde_json::from_str(json).map_err(|e| SyncError::InvalidMessage(e.to_string()))
    }

    /// Variant name for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            RemoteMessage::Subscribe { .. } => "Subscribe",
            RemoteMessage::Put(_) => "Put",
            RemoteMessage::Document(_) => "Document",
            RemoteMessage::Error { .. } => "Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolquote_core::snapshot::InventorySnapshot;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wire_shape() {
        let msg = RemoteMessage::Subscribe {
            collaborator_id: "van".into(),
        };
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "Subscribe");
        assert_eq!(value["payload"]["collaboratorId"], "van");

        let put = RemoteMessage::Put(InventorySnapshot::default().to_remote(42, "van"));
        let value: serde_json::Value = serde_json::from_str(&put.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "Put");
        assert_eq!(value["payload"]["lastUpdated"], 42);
        assert!(value["payload"]["data"]["tools"].is_array());
    }

    #[test]
    fn test_parse_document() {
        let doc = InventorySnapshot::from_template().to_remote(7, "office");
        let json = RemoteMessage::Document(doc.clone()).to_json().unwrap();
        assert_eq!(
            RemoteMessage::from_json(&json).unwrap(),
            RemoteMessage::Document(doc)
        );
    }

    #[test]
    fn test_garbage_is_invalid_message() {
        assert!(matches!(
            RemoteMessage::from_json(r#"{"type": "Teleport", "payload": {}}"#),
            Err(SyncError::InvalidMessage(_))
        ));
    }
}
