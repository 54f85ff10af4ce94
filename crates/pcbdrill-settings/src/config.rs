//! Configuration management for PCBDrill
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats; the default file lives in the
//! platform-specific config directory.
//!
//! Configuration is organized into logical sections:
//! - Drill cycle settings (plunge depth, safe height, plunge feed)
//! - Scan settings (Gerber decode failure policy)

use crate::error::{ConfigError, SettingsResult};
pub use pcbdrill_camtools::layer_scan::GerberFailurePolicy;
use pcbdrill_camtools::drill_press::{
    DrillCycleParameters, DEFAULT_PLUNGE_DEPTH, DEFAULT_PLUNGE_FEED_RATE, DEFAULT_SAFE_Z,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Drill cycle settings
///
/// The defaults are the fixed cycle: 5 mm retract, 200 mm/min plunge feed.
/// `safe_z` and `plunge_feed_rate` only change when a config file sets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillSettings {
    /// Z of the bottom of each plunge (mm, negative)
    pub plunge_depth: f64,
    /// Safe travel height (mm)
    pub safe_z: f64,
    /// Plunge feed rate (mm/min)
    pub plunge_feed_rate: f64,
}

impl Default for DrillSettings {
    fn default() -> Self {
        Self {
            plunge_depth: DEFAULT_PLUNGE_DEPTH,
            safe_z: DEFAULT_SAFE_Z,
            plunge_feed_rate: DEFAULT_PLUNGE_FEED_RATE,
        }
    }
}

impl DrillSettings {
    /// Cycle parameters for the drill G-code generator
    pub fn cycle_parameters(&self) -> DrillCycleParameters {
        DrillCycleParameters {
            plunge_depth: self.plunge_depth,
            safe_z: self.safe_z,
            plunge_feed_rate: self.plunge_feed_rate,
        }
    }
}

/// Directory scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanSettings {
    /// Abort the scan or skip the file when a Gerber layer fails to decode
    pub gerber_failure_policy: GerberFailurePolicy,
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Drill cycle settings
    pub drill: DrillSettings,
    /// Scan settings
    pub scan: ScanSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location: `<config dir>/pcbdrill/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pcbdrill").join("config.toml"))
    }

    /// Load the default config file, or defaults when it does not exist
    pub fn load_or_default() -> SettingsResult<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let out_of_range = |key: &str, reason: &str| ConfigError::OutOfRange {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if !(self.drill.plunge_depth < 0.0) {
            return Err(out_of_range("drill.plunge_depth", "must be < 0"));
        }
        if !(self.drill.safe_z > 0.0) {
            return Err(out_of_range("drill.safe_z", "must be > 0"));
        }
        if !(self.drill.plunge_feed_rate > 0.0) {
            return Err(out_of_range("drill.plunge_feed_rate", "must be > 0"));
        }
        Ok(())
    }
}

enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}
