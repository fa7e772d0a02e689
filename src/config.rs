//! Configuration
//!
//! Gameplay is fixed at compile time. The optional config file only covers
//! ambient concerns: how much gets logged and whether rumble is used at all.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Ticks per second of the game loop
pub const FRAME_RATE: u64 = 20;

/// Gamepad slot the session binds to (first enumerated gamepad)
pub const CONTROLLER_SLOT: usize = 0;

/// Motor speed for every pulse (0-65535)
pub const VIBRATION_INTENSITY: u16 = 30000;

pub const CONNECT_PULSE_MS: u64 = 600;
pub const HIT_PULSE_MS: u64 = CONNECT_PULSE_MS;
pub const MISS_PULSE_MS: u64 = 200;

const CONFIG_DIR: &str = ".config/reflexpad";
const CONFIG_FILE: &str = "config.toml";

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct AppConfig {
    /// One of trace, debug, info, warn, error
    pub log_level: String,
    /// Drive the rumble motors on connect, hit and miss
    pub rumble: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            rumble: true,
        }
    }
}

impl AppConfig {
    /// Reads the config file at `path`, `None` when there is none
    ///
    /// Runs before logging is set up, so it reports through its result only.
    pub async fn load_from(path: &Path) -> Result<Option<Self>> {
        if !tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config = Self::from_toml(&content)
            .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

        Ok(Some(config))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| eyre!("{}", e))
    }

    /// Max log level, `None` for names tracing does not know
    pub fn level(&self) -> Option<Level> {
        self.log_level.parse::<Level>().ok()
    }
}

/// Location of the optional config file
pub fn config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    path
}
