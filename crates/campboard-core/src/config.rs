//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the data service URL, the event the board opens on, and an optional
//! bearer token.
//!
//! Configuration is stored at `~/.config/campboard/config.json`. The
//! `CAMPBOARD_API_URL`, `CAMPBOARD_EVENT_ID` and `CAMPBOARD_TOKEN`
//! environment variables override the file.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "campboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_URL: &str = "http://localhost:8000/api";

pub const ENV_API_URL: &str = "CAMPBOARD_API_URL";
pub const ENV_EVENT_ID: &str = "CAMPBOARD_EVENT_ID";
pub const ENV_TOKEN: &str = "CAMPBOARD_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub event_id: Option<String>,
    /// Never written back to disk when it came from the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    pub last_event_id: Option<String>,
}

impl Config {
    /// Load the config file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Record the last-used event. The rest of the file is written back as it
    /// was read, so environment overrides and tokens never end up on disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut on_disk = Self::load_file().unwrap_or_default();
        on_disk.last_event_id = self.last_event_id.clone();
        let contents = serde_json::to_string_pretty(&on_disk)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_base_url = Some(url);
        }
        if let Some(event) = non_empty(ENV_EVENT_ID) {
            self.event_id = Some(event);
        }
        if let Some(token) = non_empty(ENV_TOKEN) {
            self.api_token = Some(token);
        }
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Explicit event first, then the one used last
    pub fn resolve_event_id(&self, cli_event: Option<&str>) -> Option<String> {
        cli_event
            .map(str::to_string)
            .or_else(|| self.event_id.clone())
            .or_else(|| self.last_event_id.clone())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Directory for the rolling log files
    pub fn log_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = Config {
            api_base_url: Some("http://file".to_string()),
            event_id: Some("e-file".to_string()),
            ..Config::default()
        };
        let vars = env(&[(ENV_API_URL, "http://env"), (ENV_TOKEN, "t0k")]);
        config.apply_overrides(|k| vars.get(k).cloned());

        assert_eq!(config.api_base_url(), "http://env");
        assert_eq!(config.event_id.as_deref(), Some("e-file"));
        assert_eq!(config.api_token.as_deref(), Some("t0k"));
    }

    #[test]
    fn test_blank_override_ignored() {
        let mut config = Config::default();
        let vars = env(&[(ENV_EVENT_ID, "  ")]);
        config.apply_overrides(|k| vars.get(k).cloned());
        assert_eq!(config.event_id, None);
        assert_eq!(config.api_base_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_resolve_event_id_precedence() {
        let config = Config {
            event_id: Some("e-config".to_string()),
            last_event_id: Some("e-last".to_string()),
            ..Config::default()
        };
        assert_eq!(config.resolve_event_id(Some("e-cli")).as_deref(), Some("e-cli"));
        assert_eq!(config.resolve_event_id(None).as_deref(), Some("e-config"));

        let config = Config {
            last_event_id: Some("e-last".to_string()),
            ..Config::default()
        };
        assert_eq!(config.resolve_event_id(None).as_deref(), Some("e-last"));
        assert_eq!(Config::default().resolve_event_id(None), None);
    }

    #[test]
    fn test_token_not_serialized_when_absent() {
        let json = serde_json::to_string(&Config::default()).expect("json");
        assert!(!json.contains("api_token"));
    }
}
