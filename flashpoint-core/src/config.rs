//! Tunable constants for scoring, classification and decay
//!
//! Every numeric knob of the model lives here with its default. None of
//! these are invariants; they are validated for internal consistency only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DEFAULT_DECAY_INTERVAL_SECS, DEFAULT_DECAY_RATE, DEFAULT_NEW_SIGNAL_RATE, DEFAULT_SEED_SCORE};

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("Thresholds must be strictly increasing: {0}")]
    NonMonotonic(&'static str),
}

fn check(field: &'static str, expected: &'static str, value: f64, ok: bool) -> Result<(), ConfigError> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, expected, value })
    }
}

/// Scoring engine parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Average severity of one counted event
    pub base_weight: f64,
    /// Acceleration assumed when the prior window is empty
    pub new_signal_rate: f64,
    /// Multiplier from acceleration rate to score modifier
    pub accel_weight: f64,
    /// Upper clamp on the acceleration modifier
    pub accel_max_boost: f64,
    /// Lower clamp on the acceleration modifier (negative)
    pub accel_max_penalty: f64,
    /// Acceleration percentage beyond which a signal is rising or cooling
    pub direction_band_pct: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_weight: 2.0,
            new_signal_rate: DEFAULT_NEW_SIGNAL_RATE,
            accel_weight: 0.3,
            accel_max_boost: 0.30,
            accel_max_penalty: -0.15,
            direction_band_pct: 10.0,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("scoring.base_weight", "> 0", self.base_weight, self.base_weight > 0.0)?;
        check("scoring.new_signal_rate", ">= 0", self.new_signal_rate, self.new_signal_rate >= 0.0)?;
        check("scoring.accel_weight", ">= 0", self.accel_weight, self.accel_weight >= 0.0)?;
        check("scoring.accel_max_boost", ">= 0", self.accel_max_boost, self.accel_max_boost >= 0.0)?;
        // A penalty of -1 or below could drive the score negative
        check(
            "scoring.accel_max_penalty",
            "in (-1, 0]",
            self.accel_max_penalty,
            self.accel_max_penalty <= 0.0 && self.accel_max_penalty > -1.0,
        )?;
        check(
            "scoring.direction_band_pct",
            ">= 0",
            self.direction_band_pct,
            self.direction_band_pct >= 0.0,
        )
    }
}

/// Score thresholds for each threat level above `low`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelThresholds {
    pub elevated: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            elevated: 10.0,
            high: 30.0,
            critical: 60.0,
        }
    }
}

impl LevelThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("levels.elevated", "> 0", self.elevated, self.elevated > 0.0)?;
        if self.elevated < self.high && self.high < self.critical {
            Ok(())
        } else {
            Err(ConfigError::NonMonotonic("levels.elevated < levels.high < levels.critical"))
        }
    }
}

/// Score thresholds for conflict states; anything below `escalating` is inactive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateThresholds {
    pub active: f64,
    pub escalating: f64,
}

impl Default for StateThresholds {
    fn default() -> Self {
        Self {
            active: 10.0,
            escalating: 4.0,
        }
    }
}

impl StateThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("states.escalating", "> 0", self.escalating, self.escalating > 0.0)?;
        if self.escalating < self.active {
            Ok(())
        } else {
            Err(ConfigError::NonMonotonic("states.escalating < states.active"))
        }
    }
}

/// Seed baseline decay parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Multiplier applied once per whole elapsed interval
    pub rate: f64,
    /// Interval length in seconds
    pub interval_secs: i64,
    /// Initial score of every seed entity
    pub seed_score: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_DECAY_RATE,
            interval_secs: DEFAULT_DECAY_INTERVAL_SECS,
            seed_score: DEFAULT_SEED_SCORE,
        }
    }
}

impl DecayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("decay.rate", "in (0, 1]", self.rate, self.rate > 0.0 && self.rate <= 1.0)?;
        check(
            "decay.interval_secs",
            "> 0",
            self.interval_secs as f64,
            self.interval_secs > 0,
        )?;
        check("decay.seed_score", ">= 0", self.seed_score, self.seed_score >= 0.0)
    }
}
