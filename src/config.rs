// Global configuration for detector construction
use crate::error::{ConfigError, ConfigResult};
use crate::units::{MM, TORR};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;

pub static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::new()));

/// Detector construction parameters that a run may tune before the geometry
/// is built.
///
/// A single global instance is exposed via the `CONFIG` static. Most code
/// should take a snapshot with [`Config::global`] or pass a `Config` directly
/// to [`crate::detector::DetectorConstruction`]; the global is read at
/// initialisation only and never on the per-event path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Residual gas pressure of the spectrometer vacuum, in torr.
    pub vacuum_pressure_torr: f64,
    /// Maximum step inside solid volumes (windows, scintillator, Kevlar), in mm.
    pub scint_step_limit_mm: f64,
    /// Run the containment check on placements flagged for it.
    pub check_overlaps: bool,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Config {
            vacuum_pressure_torr: 0.0,
            scint_step_limit_mm: 1.0,
            check_overlaps: true,
        }
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.vacuum_pressure_torr >= 0.0) || !self.vacuum_pressure_torr.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "vacuum pressure must be finite and non-negative, got {} torr",
                self.vacuum_pressure_torr
            )));
        }
        if !(self.scint_step_limit_mm > 0.0) || !self.scint_step_limit_mm.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "scintillator step limit must be positive, got {} mm",
                self.scint_step_limit_mm
            )));
        }
        Ok(())
    }

    /// Vacuum pressure in internal units (pascal).
    pub fn vacuum_pressure(&self) -> f64 {
        self.vacuum_pressure_torr * TORR
    }

    /// Solid-volume step limit in internal units (mm).
    pub fn scint_step_limit(&self) -> f64 {
        self.scint_step_limit_mm * MM
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Get the global configuration instance
    pub fn global() -> std::sync::MutexGuard<'static, Self> {
        CONFIG
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the global configuration after validating it.
    pub fn set_global(config: Config) -> ConfigResult<()> {
        config.validate()?;
        *Self::global() = config;
        Ok(())
    }
}
