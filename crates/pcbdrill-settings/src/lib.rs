//! # PCBDrill Settings
//!
//! Loads, validates, and saves the drill cycle and scan configuration.

pub mod config;
pub mod error;

pub use config::{Config, DrillSettings, GerberFailurePolicy, ScanSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
