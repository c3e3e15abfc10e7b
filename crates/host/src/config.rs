//! Configuration system for led-marquee
//!
//! Reads config from ~/.config/led-marquee/config.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::layout::SidebarKind;

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http_port: u16,
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            bind: "127.0.0.1".to_string(),
        }
    }
}

/// Panel geometry and output limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u16,
    pub height: u16,
    pub brightness: u8,
    pub volts: u8,
    pub max_milliamps: u32,
    pub max_message_len: usize,
    pub sidebar: SidebarKind,
    pub sidebar_width: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 96,
            height: 8,
            brightness: 15,
            volts: 5,
            max_milliamps: 2000,
            max_message_len: 1024,
            sidebar: SidebarKind::Clock,
            sidebar_width: 32,
        }
    }
}

/// Animation timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Milliseconds per scrolled column
    pub speed_ms: u32,
    /// Pause after a message before repeating it
    pub wait_ms: u64,
    /// Milliseconds per Life generation
    pub life_ms: u64,
    pub startup_message: String,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            speed_ms: 40,
            wait_ms: 5000,
            life_ms: 150,
            startup_message: "Hello from the marquee!".to_string(),
        }
    }
}

/// MQTT topics and reconnection. Broker address and credentials are user
/// parameters in user.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Node topics live under `<prefix>/<node>`
    pub prefix: String,
    /// Home Assistant discovery prefix
    pub discovery_prefix: String,
    pub reconnect_ms: u64,
    pub keep_alive_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            prefix: "marquee".to_string(),
            discovery_prefix: "homeassistant".to_string(),
            reconnect_ms: 2000,
            keep_alive_secs: 15,
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub display: DisplayConfig,
    pub scroll: ScrollConfig,
    pub mqtt: MqttConfig,
}

impl Config {
    /// Load configuration from default path, falling back to defaults
    pub fn load() -> Self {
        let config_path = Self::default_config_path();
        match Self::load_from_path(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("using default config: {e:#}");
                Self::default()
            }
        }
    }

    /// Directory holding config.toml and user.json
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("led-marquee")
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load from specific path. Missing keys take their defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Create default config file if it doesn't exist
    pub fn create_default_if_missing(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("failed to create config directory")?;
        }
        let content = toml::to_string_pretty(&Self::default()).context("failed to serialize config")?;
        std::fs::write(path, format!("# led-marquee configuration\n\n{content}"))
            .with_context(|| format!("failed to write {}", path.display()))
    }
}
