//! Simulation Configuration
//!
//! Loaded from JSON; every field has a default so partial files work.

use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::input::slice::DEFAULT_SMASH_THRESHOLD;
use crate::TICK_RATE;

/// Input pipeline settings applied to every attached device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Raw stick magnitude mapped to zero
    pub lower_dead_zone: f32,
    /// Raw stick magnitude mapped to one
    pub upper_dead_zone: f32,
    /// Stick smoothing rate (1.0 = no smoothing)
    pub sensitivity: f32,
    /// Magnitude above which an analog value reads as pressed
    pub state_threshold: f32,
    /// Magnitude the right stick must exceed to register a smash
    pub smash_threshold: f32,
    /// Flip the vertical axis of every composite
    pub invert_y_axis: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            lower_dead_zone: 0.2,
            upper_dead_zone: 0.9,
            sensitivity: 1.0,
            state_threshold: 0.0,
            smash_threshold: DEFAULT_SMASH_THRESHOLD,
            invert_y_axis: false,
        }
    }
}

/// Top-level configuration for a `Simulation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed simulation rate (Hz)
    pub tick_rate: u32,
    /// Scale applied to delta time (unscaled delta is kept separately)
    pub time_scale: f32,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Input pipeline settings
    pub input: InputConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            time_scale: 1.0,
            log_filter: "info".to_string(),
            input: InputConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Fixed step length in seconds.
    pub fn tick_duration(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive".into()));
        }
        if !(self.time_scale >= 0.0) {
            return Err(ConfigError::Invalid("time_scale must be non-negative".into()));
        }
        let input = &self.input;
        if !(0.0..=1.0).contains(&input.lower_dead_zone)
            || !(0.0..=1.0).contains(&input.upper_dead_zone)
            || input.lower_dead_zone >= input.upper_dead_zone
        {
            return Err(ConfigError::Invalid(format!(
                "dead zones must satisfy 0 <= lower < upper <= 1 (got {} / {})",
                input.lower_dead_zone, input.upper_dead_zone
            )));
        }
        if !(input.sensitivity > 0.0) {
            return Err(ConfigError::Invalid("sensitivity must be positive".into()));
        }
        if !(0.0..1.0).contains(&input.smash_threshold) {
            return Err(ConfigError::Invalid("smash_threshold must be in [0, 1)".into()));
        }
        Ok(())
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not valid JSON for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Parsed but out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json_str(r#"{ "tick_rate": 120, "input": { "invert_y_axis": true } }"#)
            .unwrap();
        assert_eq!(config.tick_rate, 120);
        assert!(config.input.invert_y_axis);
        assert_eq!(config.input.lower_dead_zone, 0.2);
        assert_eq!(config.time_scale, 1.0);
    }

    #[test]
    fn test_invalid_dead_zones_rejected() {
        let err = SimulationConfig::from_json_str(
            r#"{ "input": { "lower_dead_zone": 0.8, "upper_dead_zone": 0.5 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            SimulationConfig::from_json_str("{ tick_rate: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        assert!(SimulationConfig::from_json_str(r#"{ "tick_rate": 0 }"#).is_err());
    }
}
