//! Engine and kiosk configuration.
//!
//! Both structs deserialize from JSON with every field optional; missing
//! fields take the defaults below.

use crate::core::ConfigError;
use crate::input::ActiveLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Run-loop tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sleep between ticks.
    pub poll_interval_ms: u64,
    /// How long a level must hold before an edge is reported. Applies to
    /// buttons registered with `add_button_pin`.
    pub debounce_ms: u64,
    /// Most events one dispatch cycle may process, chained events included.
    pub max_chain_depth: usize,
    /// Capacity of the cross-thread injection queue.
    pub queue_capacity: usize,
    /// Transitions kept in the history log.
    pub history_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            debounce_ms: 30,
            max_chain_depth: 16,
            queue_capacity: 32,
            history_capacity: 64,
        }
    }
}

impl EngineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        if self.poll_interval_ms == 0 {
            errors.push(ConfigError::InvalidSetting {
                field: "poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_chain_depth == 0 {
            errors.push(ConfigError::InvalidSetting {
                field: "max_chain_depth",
                reason: "must allow at least one dispatch".to_string(),
            });
        }
        if self.queue_capacity == 0 {
            errors.push(ConfigError::InvalidSetting {
                field: "queue_capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::from_many(errors))
        }
    }
}

/// GPIO assignment of the kiosk's buttons and outputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskPins {
    pub mens_unsatisfied: u8,
    pub mens_neutral: u8,
    pub mens_satisfied: u8,
    pub womens_unsatisfied: u8,
    pub womens_neutral: u8,
    pub womens_satisfied: u8,
    pub reset: u8,
    pub display_sda: u8,
    pub display_scl: u8,
    pub central_buzzer: u8,
    pub mens_buzzer: u8,
    pub womens_buzzer: u8,
    pub light_strip: u8,
    pub light_strip_leds: u16,
    pub button_active_level: ActiveLevel,
}

impl Default for KioskPins {
    fn default() -> Self {
        Self {
            mens_unsatisfied: 9,
            mens_neutral: 10,
            mens_satisfied: 11,
            womens_unsatisfied: 13,
            womens_neutral: 14,
            womens_satisfied: 15,
            reset: 28,
            display_sda: 16,
            display_scl: 17,
            central_buzzer: 20,
            mens_buzzer: 8,
            womens_buzzer: 12,
            light_strip: 21,
            light_strip_leds: 8,
            button_active_level: ActiveLevel::Low,
        }
    }
}

/// Full kiosk configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub engine: EngineConfig,
    pub pins: KioskPins,
    /// Averages at or below this notify the manager.
    pub alert_threshold: f64,
    /// Length of the confirmation beep after a feedback press.
    pub feedback_beep_ms: u64,
    /// Length of each beep (and gap) in the manager alert.
    pub alert_beep_ms: u64,
    pub alert_tone_hz: u32,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            pins: KioskPins::default(),
            alert_threshold: 1.5,
            feedback_beep_ms: 100,
            alert_beep_ms: 300,
            alert_tone_hz: 523,
        }
    }
}

impl KioskConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigFileError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn feedback_beep(&self) -> Duration {
        Duration::from_millis(self.feedback_beep_ms)
    }

    pub fn alert_beep(&self) -> Duration {
        Duration::from_millis(self.alert_beep_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = match self.engine.validate() {
            Ok(()) => Vec::new(),
            Err(error) => error.into_errors(),
        };
        if !self.alert_threshold.is_finite() {
            errors.push(ConfigError::InvalidSetting {
                field: "alert_threshold",
                reason: format!("must be a finite number, got {}", self.alert_threshold),
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::from_many(errors))
        }
    }
}
