use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::QueryOptions;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";
pub const DEFAULT_UNIT: &str = "metric";
pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4500;

/// Server configuration, stored as TOML and overridable from the environment.
///
/// Example TOML:
/// api_key = "..."
/// default_unit = "metric"
/// port = 4500
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key, sent as `appid` on every upstream call.
    pub api_key: Option<String>,
    pub base_url: String,
    pub icon_base_url: String,
    pub default_unit: String,
    pub default_lang: String,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            icon_base_url: DEFAULT_ICON_BASE_URL.to_string(),
            default_unit: DEFAULT_UNIT.to_string(),
            default_lang: DEFAULT_LANG.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load the config file (or defaults when absent) and apply environment
    /// overrides on top.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = Self::load_from(&path)?;
        cfg.apply_env(|key| std::env::var(key).ok())
    }

    /// Load config from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Apply `WEATHER_*`, `DEFAULT_*`, `HOST` and `PORT` overrides.
    ///
    /// `lookup` stands in for the process environment. Empty values are
    /// treated as unset.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("WEATHER_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = get("WEATHER_API_BASE_URI") {
            self.base_url = url;
        }
        if let Some(url) = get("WEATHER_ICON_BASE_URI") {
            self.icon_base_url = url;
        }
        if let Some(unit) = get("DEFAULT_UNIT") {
            self.default_unit = unit;
        }
        if let Some(lang) = get("DEFAULT_LANG") {
            self.default_lang = lang;
        }
        if let Some(host) = get("HOST") {
            self.host = bind_host(&host);
        }
        if let Some(port) = get("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value '{port}'"))?;
        }

        Ok(self)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-info", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Returns the API key or explains how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: set WEATHER_API_KEY or run `weather-server configure`."
            )
        })
    }

    /// Process-wide default upstream options. Callers clone before merging.
    pub fn default_options(&self) -> QueryOptions {
        QueryOptions::new(self.default_unit.as_str(), self.default_lang.as_str())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `HOST` is often written as a URL (`http://localhost`); only the host
/// part can be bound.
fn bind_host(raw: &str) -> String {
    let host = raw.trim();
    let host = host
        .strip_prefix("http://")
        .or_else(|| host.strip_prefix("https://"))
        .unwrap_or(host);
    host.trim_end_matches('/').to_string()
}
