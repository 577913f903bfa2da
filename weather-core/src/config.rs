use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use url::Url;

use crate::{client::DEFAULT_REQUEST_TIMEOUT, heartbeat::DEFAULT_HEARTBEAT_INTERVAL};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const BASE_URL_ENV: &str = "WEATHER_API_BASE_URL";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_base_url = "https://weather.example.com"
/// request_timeout_secs = 15
/// heartbeat_interval_secs = 60
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub heartbeat_interval_secs: Option<u64>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted state such as recent searches.
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Resolve the API base URL: `explicit` > `WEATHER_API_BASE_URL` > file > default.
    pub fn base_url(&self, explicit: Option<&str>) -> Result<String> {
        let env = std::env::var(BASE_URL_ENV).ok();
        self.base_url_from(explicit, env.as_deref())
    }

    fn base_url_from(&self, explicit: Option<&str>, env: Option<&str>) -> Result<String> {
        let raw = explicit
            .or(env.filter(|v| !v.trim().is_empty()))
            .or(self.api_base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);

        validate_base_url(raw)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL)
    }
}

/// Check that `raw` is an absolute http(s) URL and return it without a trailing slash.
pub fn validate_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).with_context(|| format!("Invalid API base URL '{trimmed}'"))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!(
            "Unsupported scheme '{}' in API base URL '{trimmed}'; use http or https.",
            url.scheme()
        ));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
