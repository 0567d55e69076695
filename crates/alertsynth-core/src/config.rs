//! Configuration types for alertsynth.
//!
//! [`Config::load`] layers an optional TOML file over the embedded defaults.
//! [`Config::defaults`] returns the same defaults without touching the
//! filesystem (useful in tests).

use std::path::Path;

use alertsynth_time::{parse_date_token, TimestampSettings};
use serde::Deserialize;

use crate::constraints::SEVERITIES;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[sanitizer]
max_string_length = 5000
max_depth         = 64

[alert]
default_severity   = "low"
default_risk_score = 0.0

[timestamps]
default_start               = "24h"
utc_offset_minutes          = 0
business_hours_start        = 9
business_hours_end          = 17
business_hours_bias         = 0.8
weekend_bias                = 0.8
attack_burst_points         = [0.2, 0.5, 0.85]
attack_burst_spread_minutes = 30
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sanitizer: SanitizerSettings,
    #[serde(default)]
    pub alert: AlertSettings,
    #[serde(default)]
    pub timestamps: TimestampSettings,
}

/// `[sanitizer]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SanitizerSettings {
    /// Strings longer than this many characters are cut.
    #[serde(default = "default_max_string_length")]
    pub max_string_length: usize,
    /// Containers nested deeper than this are replaced by a marker.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_string_length() -> usize { 5000 }
fn default_max_depth() -> usize { 64 }

impl Default for SanitizerSettings {
    fn default() -> Self {
        Self {
            max_string_length: default_max_string_length(),
            max_depth: default_max_depth(),
        }
    }
}

/// `[alert]` section: fallbacks for constrained alert fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertSettings {
    #[serde(default = "default_severity")]
    pub default_severity: String,
    #[serde(default)]
    pub default_risk_score: f64,
}

fn default_severity() -> String { "low".to_string() }

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            default_severity: default_severity(),
            default_risk_score: 0.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Layer `path` (if given) over the built-in defaults and validate the
    /// result. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Layer a TOML document over the built-in defaults.
    pub fn from_toml(overlay: &str) -> Result<Self> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from_str(overlay, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Reject settings the normalizer could not honour.
    pub fn validate(&self) -> Result<()> {
        if !SEVERITIES.contains(&self.alert.default_severity.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "default_severity {:?} is not one of {SEVERITIES:?}",
                self.alert.default_severity
            )));
        }
        if !(0.0..=100.0).contains(&self.alert.default_risk_score) {
            return Err(Error::InvalidConfig(format!(
                "default_risk_score {} must lie in [0, 100]",
                self.alert.default_risk_score
            )));
        }
        if self.sanitizer.max_string_length == 0 {
            return Err(Error::InvalidConfig("max_string_length must be positive".into()));
        }
        if let Some(problem) = self.timestamps.problem() {
            return Err(Error::InvalidConfig(problem));
        }
        parse_date_token(&self.timestamps.default_start, chrono::Utc::now()).map_err(|err| {
            Error::InvalidConfig(format!("default_start: {err}"))
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
