//! Shared configuration for the optimizer, the simulated robot and logging.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [optimizer]
//! strategy = "heuristic"
//! seed = 42
//!
//! [optimizer.search]
//! std_dev = 2.5
//! pass_targets = [60.0, 45.0]
//!
//! [robot]
//! joint_max_speed = 1500.0
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Missing sections and fields fall back to their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Heuristic,
    Uniform,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct OptimizerConfig {
    #[serde(default)]
    pub strategy: Strategy,
    /// Seed for the velocity sampler; drawn from the OS when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub search: SearchSettings,
}

/// Parameters of the two-pass velocity search.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SearchSettings {
    #[serde(default = "default_std_dev")]
    pub std_dev: f64,
    /// Samples are clamped to `target ± clamp_range`.
    #[serde(default = "default_clamp_range")]
    pub clamp_range: f64,
    #[serde(default = "default_rollback_step")]
    pub rollback_step: f64,
    /// Target mean velocity of each pass, in order.
    #[serde(default = "default_pass_targets")]
    pub pass_targets: Vec<f64>,
    #[serde(default = "default_full_speed")]
    pub full_speed: f64,
    #[serde(default = "default_half_speed")]
    pub half_speed: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            std_dev: default_std_dev(),
            clamp_range: default_clamp_range(),
            rollback_step: default_rollback_step(),
            pass_targets: default_pass_targets(),
            full_speed: default_full_speed(),
            half_speed: default_half_speed(),
        }
    }
}

impl SearchSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.std_dev.is_finite() && self.std_dev >= 0.0) {
            return Err(format!("std_dev must be a non-negative number, got {}", self.std_dev));
        }
        if !(self.clamp_range.is_finite() && self.clamp_range >= 0.0) {
            return Err(format!("clamp_range must be a non-negative number, got {}", self.clamp_range));
        }
        if !(self.rollback_step.is_finite() && self.rollback_step > 0.0) {
            return Err(format!("rollback_step must be > 0, got {}", self.rollback_step));
        }
        if self.pass_targets.is_empty() {
            return Err("pass_targets must contain at least one target velocity".to_string());
        }
        for target in &self.pass_targets {
            if *target - self.clamp_range <= 0.0 || *target + self.clamp_range > self.full_speed {
                return Err(format!(
                    "pass target {} with clamp range {} leaves (0, {}]",
                    target, self.clamp_range, self.full_speed
                ));
            }
        }
        for (label, speed) in [("full_speed", self.full_speed), ("half_speed", self.half_speed)] {
            if !(speed > 0.0 && speed <= 100.0) {
                return Err(format!("{} must be in (0, 100], got {}", label, speed));
            }
        }
        if self.half_speed >= self.full_speed {
            return Err("half_speed must be lower than full_speed".to_string());
        }
        Ok(())
    }
}

/// Kinematic parameters of the simulated robot.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RobotConfig {
    /// Cruise speed of a joint move at 100% joint speed (mm/s).
    #[serde(default = "default_joint_max_speed")]
    pub joint_max_speed: f64,
    /// Acceleration of joint moves (mm/s²); independent of the joint speed setting.
    #[serde(default = "default_joint_acceleration")]
    pub joint_acceleration: f64,
    /// Fixed time spent settling at each location (s).
    #[serde(default = "default_settle_time")]
    pub settle_time: f64,
    #[serde(default = "default_linear_speed")]
    pub default_linear_speed: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            joint_max_speed: default_joint_max_speed(),
            joint_acceleration: default_joint_acceleration(),
            settle_time: default_settle_time(),
            default_linear_speed: default_linear_speed(),
        }
    }
}

impl RobotConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (label, value) in [
            ("joint_max_speed", self.joint_max_speed),
            ("joint_acceleration", self.joint_acceleration),
            ("default_linear_speed", self.default_linear_speed),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{} must be > 0, got {}", label, value));
            }
        }
        if !(self.settle_time.is_finite() && self.settle_time >= 0.0) {
            return Err(format!("settle_time must be >= 0, got {}", self.settle_time));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.optimizer.search.validate().map_err(ConfigError::Invalid)?;
        self.robot.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

fn default_std_dev() -> f64 { 2.5 }
fn default_clamp_range() -> f64 { 5.0 }
fn default_rollback_step() -> f64 { 5.0 }
fn default_pass_targets() -> Vec<f64> { vec![60.0, 45.0] }
fn default_full_speed() -> f64 { 100.0 }
fn default_half_speed() -> f64 { 50.0 }
fn default_joint_max_speed() -> f64 { 1500.0 }
fn default_joint_acceleration() -> f64 { 3000.0 }
fn default_settle_time() -> f64 { 0.1 }
fn default_linear_speed() -> f64 { 250.0 }
fn default_log_level() -> String { "info".to_string() }

pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read config file '{}': {}", path, e);
        ConfigError::Io(e)
    })?;
    let config: Config = toml::from_str(&contents).map_err(|e| {
        tracing::error!("Failed to parse config TOML: {}", e);
        ConfigError::Toml(e)
    })?;
    config.validate()?;
    Ok(config)
}
