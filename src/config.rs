use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sync::SessionSettings;

pub const DEFAULT_CONFIG_PATH: &str = "config/client.json";
pub const SERVER_URL_ENV: &str = "POLL_CHAT_SERVER_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the chat web server.
    pub server_url: String,
    pub poll_interval_ms: u64,
    /// Ask the server for only the most recent N messages.
    pub message_limit: Option<usize>,
    /// Status string that means "online"; anything else is offline.
    pub online_sentinel: String,
    pub form_cache_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".to_string(),
            poll_interval_ms: 3000,
            message_limit: None,
            online_sentinel: "オンライン".to_string(),
            form_cache_path: PathBuf::from("data/client.db"),
        }
    }
}

impl AppConfig {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            message_limit: self.message_limit,
            online_sentinel: self.online_sentinel.clone(),
        }
    }

    /// `POLL_CHAT_SERVER_URL` (usually from `.env`) wins over the file.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                self.server_url = url.trim().to_string();
            }
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    crate::storage::ensure_parent_dir(Path::new(path))?;
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}
