//! Hardware configuration types.
//!
//! This module contains:
//! - `HardwareInfo` - the init-time input record (string parameter map +
//!   joint declarations) handed to `DiffBotSystem::on_init`
//! - `HardwareParams` - parameters parsed and validated from the map
//! - `BotConfig` - TOML file configuration used by the binary
//!
//! Parameters arrive as strings from the external configuration loader;
//! missing or malformed values are fatal initialization errors.

use crate::error::HalError;
use crate::joint::JointDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Default control cycle time in microseconds (100 Hz).
pub const DEFAULT_CYCLE_TIME_US: u32 = 10_000;

/// Default full-scale wheel velocity for duty scaling, rad/s.
pub const DEFAULT_MAX_VELOCITY_RAD_S: f64 = 10.0;

fn default_cycle_time_us() -> u32 {
    DEFAULT_CYCLE_TIME_US
}

/// Init-time input record supplied by the external configuration loader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardwareInfo {
    /// Raw string parameters (pin numbers etc. parsed later)
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Declared joints with their interface lists
    #[serde(default)]
    pub joints: Vec<JointDescriptor>,
}

/// Parsed and validated hardware parameters.
///
/// Immutable after initialization; the encoder resolution in particular
/// is fixed at setup time and never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareParams {
    /// Left wheel joint name
    pub left_wheel_name: String,
    /// Right wheel joint name
    pub right_wheel_name: String,
    /// Left motor GPIO pin
    pub left_wheel_pin: u32,
    /// Right motor GPIO pin
    pub right_wheel_pin: u32,
    /// Encoder resolution in ticks per revolution
    pub enc_counts_per_rev: u32,
    /// Full-scale wheel velocity for duty scaling, rad/s
    pub max_velocity_rad_s: f64,
}

impl HardwareParams {
    /// Parse parameters from the raw string map.
    ///
    /// # Errors
    /// Returns `HalError::ConfigError` for missing required keys,
    /// unparseable numbers, a zero encoder resolution, duplicate wheel
    /// names, or duplicate pins.
    pub fn from_info(info: &HardwareInfo) -> Result<Self, HalError> {
        let left_wheel_name = require(info, "left_wheel_name")?.to_string();
        let right_wheel_name = require(info, "right_wheel_name")?.to_string();
        let left_wheel_pin: u32 = parse_param(info, "left_wheel_pin")?;
        let right_wheel_pin: u32 = parse_param(info, "right_wheel_pin")?;
        let enc_counts_per_rev: u32 = parse_param(info, "enc_counts_per_rev")?;

        let max_velocity_rad_s = match info.parameters.get("max_velocity_rad_s") {
            Some(raw) => raw.parse::<f64>().map_err(|e| {
                HalError::ConfigError(format!("Parameter 'max_velocity_rad_s': {e}"))
            })?,
            None => DEFAULT_MAX_VELOCITY_RAD_S,
        };

        let params = Self {
            left_wheel_name,
            right_wheel_name,
            left_wheel_pin,
            right_wheel_pin,
            enc_counts_per_rev,
            max_velocity_rad_s,
        };
        params.validate()?;
        Ok(params)
    }

    /// Validate cross-field constraints.
    fn validate(&self) -> Result<(), HalError> {
        if self.left_wheel_name.is_empty() || self.right_wheel_name.is_empty() {
            return Err(HalError::ConfigError(
                "Wheel names must not be empty".to_string(),
            ));
        }
        if self.left_wheel_name == self.right_wheel_name {
            return Err(HalError::ConfigError(format!(
                "Duplicate wheel name: {}",
                self.left_wheel_name
            )));
        }
        if self.left_wheel_pin == self.right_wheel_pin {
            return Err(HalError::ConfigError(format!(
                "Left and right wheels share pin {}",
                self.left_wheel_pin
            )));
        }
        if self.enc_counts_per_rev == 0 {
            return Err(HalError::ConfigError(
                "enc_counts_per_rev must be greater than 0".to_string(),
            ));
        }
        if self.max_velocity_rad_s <= 0.0 {
            return Err(HalError::ConfigError(
                "max_velocity_rad_s must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Look up a required string parameter.
fn require<'a>(info: &'a HardwareInfo, key: &str) -> Result<&'a str, HalError> {
    info.parameters
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| HalError::ConfigError(format!("Missing required parameter '{key}'")))
}

/// Look up and parse a required numeric parameter.
fn parse_param<T>(info: &HardwareInfo, key: &str) -> Result<T, HalError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    require(info, key)?
        .parse::<T>()
        .map_err(|e| HalError::ConfigError(format!("Parameter '{key}': {e}")))
}

/// Main configuration loaded from `diffbot.toml` by the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Control cycle time in microseconds.
    /// Defaults to DEFAULT_CYCLE_TIME_US (10000μs) if omitted.
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,

    /// Hardware parameters and joint declarations
    #[serde(default)]
    pub hardware: HardwareInfo,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            cycle_time_us: DEFAULT_CYCLE_TIME_US,
            hardware: HardwareInfo::default(),
        }
    }
}

impl BotConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, HalError> {
        info!("Loading configuration from {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| {
            HalError::ConfigError(format!("Failed to read config file {path:?}: {e}"))
        })?;

        let config: BotConfig = toml::from_str(&content).map_err(|e| {
            HalError::ConfigError(format!("Failed to parse config file {path:?}: {e}"))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the runnable configuration.
    pub fn validate(&self) -> Result<(), HalError> {
        if self.cycle_time_us == 0 {
            return Err(HalError::ConfigError(
                "cycle_time_us must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Hardware info for the component, with canonical wheel joints
    /// synthesized from the wheel-name parameters when the file declares
    /// none.
    pub fn hardware_info(&self) -> HardwareInfo {
        let mut info = self.hardware.clone();
        if info.joints.is_empty() {
            for key in ["left_wheel_name", "right_wheel_name"] {
                if let Some(name) = info.parameters.get(key) {
                    info.joints.push(JointDescriptor::wheel(name));
                }
            }
        }
        info
    }
}
