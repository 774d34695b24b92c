use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    error::AppError,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = AppConfig::default();

    if !config_path.exists() {
        return Ok(config);
    }

    let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
        path: config_path.clone(),
        source,
    })?;

    let file_config: FileConfig = toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
        path: config_path,
        source,
    })?;

    file_config.merge_into(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn returns_defaults_when_file_is_missing() {
        let config = load(Some(Path::new("./missing-config.toml"))).expect("config must load");

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn merges_file_values_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp config should be creatable");
        file.write_all(
            br#"[logging]
level = "debug"

[server]
ws_url = "ws://chat.example:9000/ws"

[sync]
reconnect_max_attempts = 8

[presence]
poll_interval_ms = 2500
"#,
        )
        .expect("must write test config");

        let config = load(Some(file.path())).expect("config must load");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.server.ws_url, "ws://chat.example:9000/ws");
        assert_eq!(config.server.api_url, AppConfig::default().server.api_url);
        assert_eq!(config.sync.reconnect_max_attempts, 8);
        assert_eq!(config.sync.dedup_window, 64);
        assert_eq!(config.presence.poll_interval_ms, 2_500);
    }

    #[test]
    fn rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp config should be creatable");
        file.write_all(b"[logging\nlevel = ")
            .expect("must write test config");

        let result = load(Some(file.path()));

        assert!(matches!(result, Err(AppError::ConfigParse { .. })));
    }
}
