use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::Brand;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub default_brand: Brand,

    #[serde(default = "default_session_path")]
    pub session_path: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_editor_ready_timeout")]
    pub editor_ready_timeout_ms: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_session_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("newsdesk")
        .join("session.json")
        .to_string_lossy()
        .to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_editor_ready_timeout() -> u64 {
    2000
}

fn default_page_size() -> u32 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            default_brand: Brand::default(),
            session_path: default_session_path(),
            request_timeout_secs: default_request_timeout(),
            editor_ready_timeout_ms: default_editor_ready_timeout(),
            page_size: default_page_size(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads the file at `path`, writing the defaults there first if it does
    /// not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save_to(path)?;
            config
        };
        config.check()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn check(&self) -> Result<()> {
        url::Url::parse(&self.api_base_url)?;
        if self.page_size == 0 {
            return Err(AppError::Config("page_size must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsdesk")
            .join("config.toml")
    }

    pub fn editor_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.editor_ready_timeout_ms)
    }
}
