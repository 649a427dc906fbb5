use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use video_detector::detector::config::DetectorConfig;

use crate::cli::OutputFormat;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Contents of `config.toml`. Missing sections and keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
    pub detector: DetectorConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// `<config dir>/vdet/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vdet").join("config.toml"))
    }

    fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
        path.map(Path::to_path_buf).or_else(Self::default_path)
    }

    /// Loads the configuration, falling back to defaults when no file exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_path(path) else {
            debug!("no config directory, using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&data)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = Self::resolve_path(path).context("Could not determine the config directory")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, self.show()?)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(path)
    }

    /// Overwrites the configuration file with the defaults.
    pub fn reset(path: Option<&Path>) -> Result<PathBuf> {
        let path = Self::default().save(path)?;
        info!(path = %path.display(), "configuration reset");
        Ok(path)
    }

    pub fn show(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Directory downloads are saved to when none is given.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
