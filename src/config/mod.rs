//! # Configuration Management Module
//!
//! TOML configuration for the quest engine and its administrative binary.
//!
//! ## Configuration Structure
//!
//! - [`LoggingConfig`] - Log level and optional log file
//! - [`QuestFilesConfig`] - Where quest definitions and temporary questmaster
//!   assignments live
//! - [`NpcAiSettings`] - Bounds of the random reputation/trait adjustments
//! - [`HappyHour`] - Reward bonuses active at boot
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mudquest::config::Config;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("mudquest.toml")?;
//!     println!("Definitions: {}", config.quests.definitions);
//!
//!     Config::create_default("mudquest.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [logging]
//! level = "info"
//! file = "mudquest.log"
//!
//! [quests]
//! definitions = "data/quests.qst"
//! temp_questmasters = "data/temp_questmasters.txt"
//!
//! [npc_ai]
//! reputation_gain_max = 5
//! trait_gain_max = 3
//!
//! [happy_hour.points]
//! percent = 50
//! ticks = 60
//! ```
//!
//! Every field has a default, so sections and keys may be left out.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use crate::quest::npc_ai::NpcAiSettings;
pub use crate::quest::reward::HappyHour;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub quests: QuestFilesConfig,
    #[serde(default)]
    pub npc_ai: NpcAiSettings,
    #[serde(default)]
    pub happy_hour: HappyHour,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Configured level, falling back to `Info` for unknown names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestFilesConfig {
    /// Quest definition record file. Any parse error aborts the boot.
    #[serde(default = "default_definitions")]
    pub definitions: String,
    #[serde(default = "default_temp_questmasters")]
    pub temp_questmasters: String,
}

fn default_definitions() -> String {
    "data/quests.qst".to_string()
}

fn default_temp_questmasters() -> String {
    "data/temp_questmasters.txt".to_string()
}

impl Default for QuestFilesConfig {
    fn default() -> Self {
        Self {
            definitions: default_definitions(),
            temp_questmasters: default_temp_questmasters(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;
        Self::from_toml(&content).map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))
    }

    /// Load `path`, or use the defaults when the file does not exist. A file
    /// that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            log::warn!("Config file {} not found, using defaults", path);
            return Ok(Config::default());
        }
        Self::load(path)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Create a default configuration file
    pub fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content).map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}
