/// Configuration management for bisonfix
///
/// bisonfix stores configuration in ~/.bisonfix/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = r#"# bisonfix Configuration File
# See 'bisonfix config --show' for the effective values

[backup]
# Suffix appended to backup copies (default: ".bak")
#suffix = ".bak"

# Write a backup before replacing each file (default: true)
#enabled = true

[processing]
# Number of context lines to show around changes (default: 2)
#context_lines = 2

# Keep processing remaining files after a failure (default: false)
#keep_going = false
"#;

/// bisonfix configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backup settings
    #[serde(default)]
    pub backup: BackupConfig,

    /// Processing settings
    #[serde(default)]
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Suffix appended to backup copies
    #[serde(default = "default_suffix")]
    pub suffix: Option<String>,

    /// Write a backup before replacing each file
    #[serde(default = "default_enabled")]
    pub enabled: Option<bool>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            enabled: default_enabled(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Number of context lines to show around changes
    #[serde(default = "default_context_lines")]
    pub context_lines: Option<usize>,

    /// Keep processing remaining files after a failure
    #[serde(default = "default_keep_going")]
    pub keep_going: Option<bool>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
            keep_going: default_keep_going(),
        }
    }
}

// Default functions for serde
fn default_suffix() -> Option<String> {
    Some(crate::backup::DEFAULT_SUFFIX.to_string())
}
fn default_enabled() -> Option<bool> {
    Some(true)
}
fn default_context_lines() -> Option<usize> {
    Some(2)
}
fn default_keep_going() -> Option<bool> {
    Some(false)
}

impl Config {
    /// Path of the configuration file (~/.bisonfix/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
        Ok(home_dir.join(".bisonfix").join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Create the commented default config file if it is missing, returning
    /// its path.
    pub fn ensure_exists() -> Result<PathBuf> {
        let path = Self::config_path()?;
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
            fs::write(&path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        }
        Ok(path)
    }

    /// Effective configuration rendered as TOML.
    pub fn show(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
