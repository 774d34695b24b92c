use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub server: ServerConfig,
    pub sync: SyncConfig,
    pub presence: PresenceConfig,
    pub draft: DraftConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Base URL of the live socket endpoint; the identity id is appended as
    /// the final path segment.
    pub ws_url: String,
    /// Base URL of the REST persistence/presence collaborator.
    pub api_url: String,
    pub auth_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8000/ws".to_owned(),
            api_url: "http://localhost:8000/api".to_owned(),
            auth_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    pub connect_timeout_ms: u64,
    pub reconnect_base_delay_ms: u64,
    pub reconnect_max_attempts: u32,
    /// Attempt count beyond which the linear backoff delay stops growing.
    pub reconnect_backoff_cap: u32,
    pub dedup_window: usize,
    pub typing_ttl_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            reconnect_base_delay_ms: 1_000,
            reconnect_max_attempts: 5,
            reconnect_backoff_cap: 5,
            dedup_window: 64,
            typing_ttl_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceConfig {
    pub poll_interval_ms: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DraftConfig {
    pub autosave_idle_ms: u64,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            autosave_idle_ms: 1_000,
        }
    }
}
