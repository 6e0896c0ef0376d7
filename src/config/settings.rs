//! Application configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the config format
    pub version: u32,
    /// Message ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Render tick settings
    #[serde(default)]
    pub render: RenderConfig,
    /// Board health settings
    #[serde(default)]
    pub health: HealthConfig,
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "omnidash", "omnidash")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            ingest: IngestConfig::default(),
            render: RenderConfig::default(),
            health: HealthConfig::default(),
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Only messages whose channel starts with this prefix are dispatched
    #[serde(default)]
    pub channel_filter: String,
    /// Log and skip malformed messages instead of stopping ingestion
    #[serde(default = "default_true")]
    pub skip_malformed: bool,
}

fn default_true() -> bool {
    true
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            channel_filter: String::new(),
            skip_malformed: true,
        }
    }
}

/// Render loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Tick period of the render loop
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Print a summary frame every N ticks (0 disables periodic frames)
    #[serde(default = "default_summary_every")]
    pub summary_every_ticks: u32,
    /// Emit frames as JSON lines instead of text
    #[serde(default)]
    pub json: bool,
}

fn default_tick_interval() -> u64 {
    100
}

fn default_summary_every() -> u32 {
    10
}

impl RenderConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            summary_every_ticks: default_summary_every(),
            json: false,
        }
    }
}

/// Board health configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// A board silent for this long is marked dead
    #[serde(default = "default_health_timeout")]
    pub timeout_ms: u64,
    /// Formatted messages kept per board
    #[serde(default = "default_history_len")]
    pub history_len: usize,
}

fn default_health_timeout() -> u64 {
    10_000
}

fn default_history_len() -> usize {
    50
}

impl HealthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_health_timeout(),
            history_len: default_history_len(),
        }
    }
}
