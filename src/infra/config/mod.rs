mod app_config;
mod file_config;
mod loader;

pub use app_config::{
    AppConfig, DraftConfig, LogConfig, PresenceConfig, ServerConfig, SyncConfig,
};
pub use loader::load;
