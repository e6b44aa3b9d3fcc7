//! Service configuration loaded from TOML
//!
//! Every section is optional; missing keys take their defaults.
//!
//! ```toml
//! [scoring]
//! base_weight = 2.0
//!
//! [states]
//! active = 10.0
//!
//! [service]
//! cache_ttl_secs = 900
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use flashpoint_core::{
    ConfigError, DecayConfig, LevelThresholds, ScoringConfig, StateThresholds, DEFAULT_WINDOW_DAYS,
};

/// Errors loading a configuration file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

/// Pipeline and cache parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Rolling window length in days
    pub window_days: i64,
    /// Result cache time-to-live in seconds
    pub cache_ttl_secs: u64,
    /// Per-adapter call timeout in seconds
    pub adapter_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            cache_ttl_secs: 1800,
            adapter_timeout_secs: 10,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days <= 0 {
            return Err(ConfigError::OutOfRange {
                field: "service.window_days",
                expected: "> 0",
                value: self.window_days as f64,
            });
        }
        if self.adapter_timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "service.adapter_timeout_secs",
                expected: "> 0",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Complete configuration for one aggregation service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashpointConfig {
    pub scoring: ScoringConfig,
    pub levels: LevelThresholds,
    pub states: StateThresholds,
    pub decay: DecayConfig,
    pub service: ServiceConfig,
}

impl FlashpointConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, LoadError> {
        let config: FlashpointConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.levels.validate()?;
        self.states.validate()?;
        self.decay.validate()?;
        self.service.validate()
    }
}
