use serde::Deserialize;

use crate::infra::config::{
    AppConfig, DraftConfig, LogConfig, PresenceConfig, ServerConfig, SyncConfig,
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub server: Option<FileServerConfig>,
    pub sync: Option<FileSyncConfig>,
    pub presence: Option<FilePresenceConfig>,
    pub draft: Option<FileDraftConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(server) = self.server {
            server.merge_into(&mut config.server);
        }

        if let Some(sync) = self.sync {
            sync.merge_into(&mut config.sync);
        }

        if let Some(presence) = self.presence {
            presence.merge_into(&mut config.presence);
        }

        if let Some(draft) = self.draft {
            draft.merge_into(&mut config.draft);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileServerConfig {
    pub ws_url: Option<String>,
    pub api_url: Option<String>,
    pub auth_token: Option<String>,
}

impl FileServerConfig {
    fn merge_into(self, config: &mut ServerConfig) {
        if let Some(ws_url) = self.ws_url {
            config.ws_url = ws_url;
        }

        if let Some(api_url) = self.api_url {
            config.api_url = api_url;
        }

        if let Some(auth_token) = self.auth_token {
            config.auth_token = Some(auth_token);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileSyncConfig {
    pub connect_timeout_ms: Option<u64>,
    pub reconnect_base_delay_ms: Option<u64>,
    pub reconnect_max_attempts: Option<u32>,
    pub reconnect_backoff_cap: Option<u32>,
    pub dedup_window: Option<usize>,
    pub typing_ttl_ms: Option<u64>,
}

impl FileSyncConfig {
    fn merge_into(self, config: &mut SyncConfig) {
        if let Some(connect_timeout_ms) = self.connect_timeout_ms {
            config.connect_timeout_ms = connect_timeout_ms;
        }

        if let Some(reconnect_base_delay_ms) = self.reconnect_base_delay_ms {
            config.reconnect_base_delay_ms = reconnect_base_delay_ms;
        }

        if let Some(reconnect_max_attempts) = self.reconnect_max_attempts {
            config.reconnect_max_attempts = reconnect_max_attempts;
        }

        if let Some(reconnect_backoff_cap) = self.reconnect_backoff_cap {
            config.reconnect_backoff_cap = reconnect_backoff_cap;
        }

        if let Some(dedup_window) = self.dedup_window {
            config.dedup_window = dedup_window;
        }

        if let Some(typing_ttl_ms) = self.typing_ttl_ms {
            config.typing_ttl_ms = typing_ttl_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FilePresenceConfig {
    pub poll_interval_ms: Option<u64>,
}

impl FilePresenceConfig {
    fn merge_into(self, config: &mut PresenceConfig) {
        if let Some(poll_interval_ms) = self.poll_interval_ms {
            config.poll_interval_ms = poll_interval_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDraftConfig {
    pub autosave_idle_ms: Option<u64>,
}

impl FileDraftConfig {
    fn merge_into(self, config: &mut DraftConfig) {
        if let Some(autosave_idle_ms) = self.autosave_idle_ms {
            config.autosave_idle_ms = autosave_idle_ms;
        }
    }
}
