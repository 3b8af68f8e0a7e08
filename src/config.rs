//! Configuration for pastel-probe.
//!
//! Loaded from `~/.pastel/config.toml`; a missing or unreadable file means
//! defaults. Command line flags override whatever the file says.
//!
//! ```toml
//! # auto, always, never
//! color = "auto"
//!
//! # Try to turn on ANSI processing for stdout at startup
//! enable_ansi = true
//!
//! [log]
//! level = "info"
//! file = "C:/Users/me/.pastel/pastel-probe.log"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::ColorMode;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// When to emit colored output
    pub color: ColorMode,
    /// Enable virtual-terminal processing on stdout at startup
    pub enable_ansi: bool,
    /// Logging settings
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color: ColorMode::Auto,
            enable_ansi: true,
            log: LogConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive (overridden by RUST_LOG)
    pub level: String,
    /// Log file; defaults to `~/.pastel/pastel-probe.log`
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::get_config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Log file location, explicit or default
    pub fn log_path(&self) -> PathBuf {
        self.log
            .file
            .clone()
            .or_else(|| config_dir().map(|d| d.join("pastel-probe.log")))
            .unwrap_or_else(|| PathBuf::from("pastel-probe.log"))
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        config_dir().map(|d| d.join("config.toml"))
    }
}

/// `~/.pastel`
pub fn config_dir() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".pastel"))
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}
