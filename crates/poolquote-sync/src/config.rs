//! # Sync Configuration
//!
//! Where the local store lives, who this collaborator is, and how to reach
//! the remote document store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     POOLQUOTE_REMOTE_MODE=websocket                                    │
//! │     POOLQUOTE_REMOTE_URL=ws://192.168.1.20:8765/ws                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/poolquote/poolquote.toml (Linux)                         │
//! │     ~/Library/Application Support/com.poolquote.poolquote/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     offline, generated collaborator id, 1000 ms debounce               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [collaborator]
//! id = "550e8400-e29b-41d4-a716-446655440000"
//! name = "Install van"
//!
//! [remote]
//! mode = "websocket"      # offline | websocket
//! url = "ws://192.168.1.20:8765/ws"
//!
//! [persist]
//! debounce_ms = 1000
//!
//! [relay]
//! port = 8765
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{SyncError, SyncResult};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "POOLQUOTE_";

// =============================================================================
// Remote Mode
// =============================================================================

/// How edits reach other collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteMode {
    /// Local store only. Edits are never pushed.
    #[default]
    Offline,

    /// Push and subscribe through a relay over WebSocket.
    Websocket,
}

impl RemoteMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, RemoteMode::Offline)
    }
}

impl std::fmt::Display for RemoteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteMode::Offline => write!(f, "offline"),
            RemoteMode::Websocket => write!(f, "websocket"),
        }
    }
}

impl std::str::FromStr for RemoteMode {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "offline" | "disabled" | "local" => Ok(RemoteMode::Offline),
            "websocket" | "ws" => Ok(RemoteMode::Websocket),
            other => Err(SyncError::InvalidConfig(format!(
                "Unknown remote mode: '{}'. Valid options: offline, websocket",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Who is editing. Stamped on every remote document as `lastUpdatedBy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaboratorConfig {
    /// Generated on first run if not provided.
    pub id: String,

    #[serde(default = "default_collaborator_name")]
    pub name: String,
}

fn default_collaborator_name() -> String {
    "PoolQuote".to_string()
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        CollaboratorConfig {
            id: Uuid::new_v4().to_string(),
            name: default_collaborator_name(),
        }
    }
}

/// Remote document store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default)]
    pub mode: RemoteMode,

    /// Relay WebSocket URL. Required in websocket mode.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum reconnection attempts before giving up. 0 retries forever.
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}
fn default_initial_backoff() -> u64 {
    500
}
fn default_max_backoff() -> u64 {
    60
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            mode: RemoteMode::default(),
            url: None,
            connect_timeout_secs: default_connect_timeout(),
            max_retries: 0,
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

/// Local persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistSettings {
    /// Quiet period after the last edit before the snapshot is written.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

fn default_debounce_ms() -> u64 {
    1000
}

impl Default for PersistSettings {
    fn default() -> Self {
        PersistSettings {
            debounce_ms: default_debounce_ms(),
            database_path: None,
        }
    }
}

/// Settings for hosting a relay (`poolquote relay`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaySettings {
    #[serde(default = "default_relay_port")]
    pub port: u16,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_relay_port() -> u16 {
    8765
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

impl Default for RelaySettings {
    fn default() -> Self {
        RelaySettings {
            port: default_relay_port(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RelaySettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub collaborator: CollaboratorConfig,

    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub persist: PersistSettings,

    #[serde(default)]
    pub relay: RelaySettings,
}

impl SyncConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (poolquote.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Writes the config as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml_string()?)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    pub fn to_toml_string(&self) -> SyncResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.collaborator.id.trim().is_empty() {
            return Err(SyncError::MissingCollaboratorId);
        }

        if let Some(ref raw) = self.remote.url {
            let url = Url::parse(raw)?;
            if !matches!(url.scheme(), "ws" | "wss") {
                return Err(SyncError::InvalidUrl(format!(
                    "Remote URL must start with ws:// or wss://, got: {}",
                    raw
                )));
            }
        }

        if self.remote.mode == RemoteMode::Websocket && self.remote.url.is_none() {
            return Err(SyncError::InvalidConfig(
                "websocket mode needs remote.url".into(),
            ));
        }

        if self.persist.debounce_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "debounce_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `POOLQUOTE_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(id) = var("COLLABORATOR_ID") {
            debug!(collaborator_id = %id, "Overriding collaborator ID from environment");
            self.collaborator.id = id;
        }

        if let Some(name) = var("COLLABORATOR_NAME") {
            self.collaborator.name = name;
        }

        if let Some(mode) = var("REMOTE_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding remote mode from environment");
                    self.remote.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown remote mode in environment"),
            }
        }

        if let Some(url) = var("REMOTE_URL") {
            debug!(url = %url, "Overriding remote URL from environment");
            self.remote.url = Some(url);
        }

        if let Some(ms) = var("DEBOUNCE_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.persist.debounce_ms = ms,
                Err(_) => warn!(value = %ms, "Ignoring non-numeric POOLQUOTE_DEBOUNCE_MS"),
            }
        }

        if let Some(path) = var("DB_PATH") {
            self.persist.database_path = Some(PathBuf::from(path));
        }

        if let Some(port) = var("RELAY_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                debug!(port = p, "Overriding relay port from environment");
                self.relay.port = p;
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "poolquote", "poolquote")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("poolquote.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn collaborator_id(&self) -> &str {
        &self.collaborator.id
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.persist.debounce_ms)
    }

    /// Configured database file, else `poolquote.db` in the platform data
    /// directory, else the working directory.
    pub fn database_path(&self) -> PathBuf {
        self.persist
            .database_path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join("poolquote.db")))
            .unwrap_or_else(|| PathBuf::from("poolquote.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_remote_mode_parsing() {
        assert_eq!("offline".parse::<RemoteMode>().unwrap(), RemoteMode::Offline);
        assert_eq!("WS".parse::<RemoteMode>().unwrap(), RemoteMode::Websocket);
        assert!("firebase".parse::<RemoteMode>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert!(!config.collaborator.id.is_empty());
        assert_eq!(config.remote.mode, RemoteMode::Offline);
        assert_eq!(config.debounce(), Duration::from_millis(1000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();

        config.collaborator.id = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(SyncError::MissingCollaboratorId)
        ));
        config.collaborator.id = "van".to_string();

        config.remote.mode = RemoteMode::Websocket;
        assert!(config.validate().is_err());

        config.remote.url = Some("http://relay.local".to_string());
        assert!(matches!(config.validate(), Err(SyncError::InvalidUrl(_))));

        config.remote.url = Some("not a url".to_string());
        assert!(matches!(config.validate(), Err(SyncError::InvalidUrl(_))));

        config.remote.url = Some("ws://192.168.1.20:8765/ws".to_string());
        assert!(config.validate().is_ok());

        config.persist.debounce_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SyncConfig::default();
        config.apply_overrides(env(&[
            ("POOLQUOTE_COLLABORATOR_ID", "office"),
            ("POOLQUOTE_REMOTE_MODE", "websocket"),
            ("POOLQUOTE_REMOTE_URL", "wss://relay.example.com/ws"),
            ("POOLQUOTE_DEBOUNCE_MS", "250"),
            ("POOLQUOTE_DB_PATH", "/tmp/pq.db"),
        ]));

        assert_eq!(config.collaborator_id(), "office");
        assert_eq!(config.remote.mode, RemoteMode::Websocket);
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/pq.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = SyncConfig::default();
        config.apply_overrides(env(&[
            ("POOLQUOTE_REMOTE_MODE", "carrier-pigeon"),
            ("POOLQUOTE_DEBOUNCE_MS", "soon"),
        ]));
        assert_eq!(config.remote.mode, RemoteMode::Offline);
        assert_eq!(config.persist.debounce_ms, 1000);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SyncConfig::default();
        config.remote.mode = RemoteMode::Websocket;
        config.remote.url = Some("ws://localhost:8765/ws".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[collaborator]"));
        assert!(toml_str.contains("mode = \"websocket\""));

        let parsed: SyncConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_takes_defaults() {
        let parsed: SyncConfig = toml::from_str("[persist]\ndebounce_ms = 2000\n").unwrap();
        assert_eq!(parsed.persist.debounce_ms, 2000);
        assert_eq!(parsed.relay.port, 8765);
        assert!(!parsed.collaborator.id.is_empty());
    }
}
