use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Backend application id used when neither the config file nor the
/// environment provides one
pub const DEFAULT_APP_ID: &str = "24bbe2a1-3dd7-4070-83c0-0f10f1abc940";

/// Default hosted API root
pub const DEFAULT_API_URI: &str = "https://api.instantdb.com";

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub fixture: FixtureConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Which store backs the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Live,
    Fixture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default = "default_api_uri")]
    pub api_uri: String,
    /// Optional admin token for the HTTP query/transact endpoints
    #[serde(default)]
    pub admin_token: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            kind: BackendKind::Live,
            app_id: default_app_id(),
            api_uri: default_api_uri(),
            admin_token: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}

fn default_api_uri() -> String {
    DEFAULT_API_URI.to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// JSON file the fixture store is persisted to. In-memory only if absent.
    /// Relative paths resolve against the config directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// The one code the fixture accepts for every email
    #[serde(default = "default_fixture_code")]
    pub code: String,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        FixtureConfig {
            path: None,
            code: default_fixture_code(),
        }
    }
}

fn default_fixture_code() -> String {
    "123456".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long the "task done" overlay stays up
    #[serde(default = "default_celebration_ms")]
    pub celebration_ms: u64,
    /// Color overrides, e.g. `background = "#000000"`
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Mouse capture for drag-to-reorder. On unless disabled.
    #[serde(default = "default_true")]
    pub mouse: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            celebration_ms: default_celebration_ms(),
            colors: HashMap::new(),
            mouse: true,
        }
    }
}

fn default_celebration_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}
