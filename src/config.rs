use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use tracing::debug;

use crate::calculator::DEFAULT_TIP_PERCENT;
use crate::i18n::TipLocale;
use crate::inputs::{BlankTipPolicy, IntoTipDecimal};
use crate::types::TipError;

/// Settings shared by the calculator and the screen model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TipConfig {
    /// Locale used for currency formatting and labels.
    pub locale: TipLocale,
    /// Percentage used when the tip field is blank and the policy asks for it.
    pub default_tip_percent: Decimal,
    pub blank_tip: BlankTipPolicy,
}

impl Default for TipConfig {
    fn default() -> Self {
        TipConfig {
            locale: TipLocale::default(),
            default_tip_percent: DEFAULT_TIP_PERCENT,
            blank_tip: BlankTipPolicy::default(),
        }
    }
}

impl std::str::FromStr for TipConfig {
    type Err = TipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: TipConfig = serde_json::from_str(s)
            .map_err(|e| TipError::ConfigurationError(format!("Failed to parse config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

impl TipConfig {
    /// Default settings for the locale the process runs under.
    pub fn for_host() -> Self {
        TipConfig {
            locale: TipLocale::host(),
            ..Default::default()
        }
    }

    pub fn with_locale(mut self, locale: TipLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_blank_tip(mut self, policy: BlankTipPolicy) -> Self {
        self.blank_tip = policy;
        self
    }

    pub fn with_default_tip_percent(mut self, percent: impl IntoTipDecimal) -> Result<Self, TipError> {
        self.default_tip_percent = percent.into_tip_decimal()?;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), TipError> {
        if self.default_tip_percent < Decimal::ZERO {
            return Err(TipError::ConfigurationError(
                "Default tip percent must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Host defaults overridden by `TIPTIME_LOCALE`, `TIPTIME_DEFAULT_TIP_PERCENT`
    /// and `TIPTIME_BLANK_TIP` where set.
    pub fn from_env() -> Result<Self, TipError> {
        Self::from_env_lookup(|key| env::var(key).ok())
    }

    pub fn from_env_lookup<F>(lookup: F) -> Result<Self, TipError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::for_host().with_env_overrides(lookup)
    }

    /// Applies the `TIPTIME_*` variables on top of `self`.
    pub fn with_env_overrides<F>(self, lookup: F) -> Result<Self, TipError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self;

        if let Some(locale) = lookup("TIPTIME_LOCALE") {
            config.locale = locale.parse()?;
        }
        if let Some(percent) = lookup("TIPTIME_DEFAULT_TIP_PERCENT") {
            config.default_tip_percent = percent
                .trim()
                .parse::<Decimal>()
                .map_err(|e| TipError::ConfigurationError(format!("Invalid default tip percent: {}", e)))?;
        }
        if let Some(policy) = lookup("TIPTIME_BLANK_TIP") {
            config.blank_tip = policy.parse()?;
        }

        config.validate()?;
        debug!(?config, "applied environment overrides");
        Ok(config)
    }

    /// Attempts to load configuration from a JSON file.
    pub fn try_from_json(path: &str) -> Result<Self, TipError> {
        let content = fs::read_to_string(path)
            .map_err(|e| TipError::ConfigurationError(format!("Failed to read config file: {}", e)))?;
        content.parse()
    }
}
