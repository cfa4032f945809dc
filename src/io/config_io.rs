use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Environment variable that overrides `backend.app_id`
pub const APP_ID_ENV: &str = "INSTANT_APP_ID";

/// Error type for loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Per-user directory for config, session and log files, respecting
/// XDG_CONFIG_HOME
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    base.join("sprintone")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Read a config file. A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Apply environment overrides. Empty values are ignored.
pub fn apply_env(config: &mut AppConfig, app_id: Option<String>) {
    if let Some(id) = app_id.filter(|v| !v.trim().is_empty()) {
        config.backend.app_id = id.trim().to_string();
    }
}

/// Load config from `path` (or the default location) plus environment.
/// Returns the config and the directory relative paths resolve against.
pub fn load_config(path: Option<&Path>) -> Result<(AppConfig, PathBuf), ConfigError> {
    let (file, dir) = match path {
        Some(p) => (
            p.to_path_buf(),
            p.parent().map(Path::to_path_buf).unwrap_or_default(),
        ),
        None => {
            let dir = config_dir();
            (dir.join("config.toml"), dir)
        }
    };
    let mut config = read_config(&file)?;
    apply_env(&mut config, std::env::var(APP_ID_ENV).ok());
    tracing::debug!(path = %file.display(), kind = ?config.backend.kind, "config loaded");
    Ok((config, dir))
}
