use crate::hotkey::{parse_hotkey, Hotkey};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_LAUNCHER_HOTKEY: &str = "CmdOrCtrl+K";
pub const DEFAULT_BUILTIN_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BUILTIN_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Shortcut toggling the command launcher.
    #[serde(default = "default_launcher_hotkey")]
    pub launcher_hotkey: String,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Also write logs to a daily rolling file inside the data directory.
    #[serde(default)]
    pub log_to_file: bool,
    /// Delay between the last translator edit and the automatic request.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum number of entries kept in the calculator and translator history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Model used by the built-in translation provider.
    #[serde(default = "default_builtin_model")]
    pub builtin_model: String,
    #[serde(default = "default_builtin_endpoint")]
    pub builtin_endpoint: String,
    /// Pause between clearing and restoring an embedded frame on refresh.
    #[serde(default = "default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,
}

fn default_launcher_hotkey() -> String {
    DEFAULT_LAUNCHER_HOTKEY.into()
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_history_limit() -> usize {
    crate::history::HISTORY_LIMIT
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_initial_delay_ms() -> u64 {
    1500
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_builtin_model() -> String {
    DEFAULT_BUILTIN_MODEL.into()
}

fn default_builtin_endpoint() -> String {
    DEFAULT_BUILTIN_ENDPOINT.into()
}

fn default_refresh_delay_ms() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            launcher_hotkey: default_launcher_hotkey(),
            debug_logging: false,
            log_to_file: false,
            debounce_ms: default_debounce_ms(),
            history_limit: default_history_limit(),
            retry_attempts: default_retry_attempts(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            builtin_model: default_builtin_model(),
            builtin_endpoint: default_builtin_endpoint(),
            refresh_delay_ms: default_refresh_delay_ms(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn launcher_hotkey(&self) -> Hotkey {
        match parse_hotkey(&self.launcher_hotkey) {
            Some(k) => k,
            None => {
                tracing::warn!(
                    "provided launcher_hotkey '{}' is invalid; using default {}",
                    self.launcher_hotkey,
                    DEFAULT_LAUNCHER_HOTKEY
                );
                Hotkey::default()
            }
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Resolve the data directory: explicit override, then `MULTI_TOOLBOX_DIR`,
/// then the platform data directory.
pub fn data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var("MULTI_TOOLBOX_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs_next::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("multi_toolbox")
}
