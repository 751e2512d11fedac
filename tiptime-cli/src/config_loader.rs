//! Persistent CLI Configuration Loader
//!
//! Configuration is loaded from `~/.config/tiptime/config.toml` on Linux,
//! `~/Library/Application Support/tiptime/config.toml` on macOS
//! or `%APPDATA%\tiptime\config.toml` on Windows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tiptime::{TipConfig, TipError};
use tracing::{debug, warn};

/// CLI Configuration structure loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliConfig {
    /// Locale code (e.g., "en-US", "de-DE").
    pub locale: Option<String>,
    /// Percentage used when the tip field is left blank.
    pub default_tip_percent: Option<Decimal>,
    /// "default-percent" or "zero".
    pub blank_tip: Option<String>,
    /// Enable file logging by default.
    pub enable_logging: Option<bool>,
}

impl CliConfig {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tiptime"))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Reads the config file. `Ok(None)` when there is no file to read.
    ///
    /// Runs before logging is set up, so failures are returned for the
    /// caller to report rather than logged here.
    pub fn read() -> Result<Option<Self>, String> {
        let Some(path) = Self::config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read config file {:?}: {}", path, e))?;
        Self::parse(&content)
            .map(Some)
            .map_err(|e| format!("Failed to parse config file {:?}: {}", path, e))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Layers the file settings over `base`.
    pub fn apply(&self, base: TipConfig) -> Result<TipConfig, TipError> {
        let mut config = base;
        if let Some(locale) = &self.locale {
            config.locale = locale.parse()?;
        }
        if let Some(percent) = self.default_tip_percent {
            config.default_tip_percent = percent;
        }
        if let Some(policy) = &self.blank_tip {
            config.blank_tip = policy.parse()?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Like [`CliConfig::apply`], but an invalid file setting is reported
    /// and `base` used unchanged, the same as an unparsable file.
    pub fn apply_or_default(&self, base: TipConfig) -> TipConfig {
        match self.apply(base.clone()) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file settings: {}", e);
                base
            }
        }
    }

    /// Saves the current configuration to the default config file location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "Could not determine config directory")
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(&path, content)?;
        debug!("Saved configuration to {:?}", path);
        Ok(path)
    }

    pub fn sample() -> Self {
        CliConfig {
            locale: Some("en-US".to_string()),
            default_tip_percent: Some(Decimal::from(15)),
            blank_tip: Some("default-percent".to_string()),
            enable_logging: Some(false),
        }
    }
}
