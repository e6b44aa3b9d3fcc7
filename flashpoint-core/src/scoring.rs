//! Scoring engine - volume and acceleration to score, direction and level
//!
//! Pure functions only; this is the unit-test boundary of the model.

use serde::{Deserialize, Serialize};

use crate::{Direction, LevelThresholds, ScoringConfig, ThreatLevel};

/// Result of scoring one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub score: f64,
    pub direction: Direction,
    pub level: ThreatLevel,
    /// Proportional change between windows
    pub acceleration_rate: f64,
    /// `acceleration_rate` as a rounded percentage
    pub acceleration_pct: f64,
}

/// Scores entities from current and prior window counts
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
    levels: LevelThresholds,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig, levels: LevelThresholds) -> Self {
        Self { config, levels }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn levels(&self) -> &LevelThresholds {
        &self.levels
    }

    /// Growth between windows; entities with no prior baseline get `new_signal_rate`
    pub fn acceleration_rate(&self, current: f64, prior: f64) -> f64 {
        if prior > 0.0 {
            (current - prior) / prior
        } else if current > 0.0 {
            self.config.new_signal_rate
        } else {
            0.0
        }
    }

    /// Asymmetric clamp: escalations may move the score more than de-escalations
    pub fn acceleration_modifier(&self, rate: f64) -> f64 {
        (rate * self.config.accel_weight).clamp(self.config.accel_max_penalty, self.config.accel_max_boost)
    }

    pub fn score(&self, current: f64, prior: f64) -> Score {
        let current = sanitize(current);
        let prior = sanitize(prior);

        let rate = self.acceleration_rate(current, prior);
        let modifier = self.acceleration_modifier(rate);
        let score = (current * self.config.base_weight * (1.0 + modifier)).round().max(0.0);
        // + 0.0 folds a rounded -0 into 0
        let pct = (rate * 100.0).round() + 0.0;

        let direction = if pct > self.config.direction_band_pct {
            Direction::Rising
        } else if pct < -self.config.direction_band_pct {
            Direction::Cooling
        } else {
            Direction::Stable
        };

        Score {
            score,
            direction,
            level: ThreatLevel::from_score(score, &self.levels),
            acceleration_rate: rate,
            acceleration_pct: pct,
        }
    }

    /// Classify an arbitrary score (e.g. a decayed baseline)
    pub fn level_for(&self, score: f64) -> ThreatLevel {
        ThreatLevel::from_score(score, &self.levels)
    }
}

fn sanitize(count: f64) -> f64 {
    if count.is_finite() && count > 0.0 {
        count
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ScoringEngine {
        ScoringEngine::default()
    }

    #[test]
    fn test_zero_counts() {
        let s = engine().score(0.0, 0.0);
        assert_eq!(s.score, 0.0);
        assert_eq!(s.direction, Direction::Stable);
        assert_eq!(s.level, ThreatLevel::Low);
    }

    #[test]
    fn test_doubling_scenario() {
        // rate 1.0, modifier clamp(0.3, -0.15, 0.30) = 0.30, round(20 * 2.0 * 1.3) = 52
        let s = engine().score(20.0, 10.0);
        assert_eq!(s.acceleration_rate, 1.0);
        assert_eq!(s.score, 52.0);
        assert_eq!(s.level, ThreatLevel::High);
        assert_eq!(s.direction, Direction::Rising);
        assert_eq!(s.acceleration_pct, 100.0);
    }

    #[test]
    fn test_new_signal_rate() {
        let e = engine();
        assert_eq!(e.acceleration_rate(4.0, 0.0), 0.5);
        // modifier 0.15 -> round(4 * 2 * 1.15) = 9
        assert_eq!(e.score(4.0, 0.0).score, 9.0);
    }

    #[test]
    fn test_penalty_clamp_is_smaller_than_boost() {
        let e = engine();
        assert_eq!(e.acceleration_modifier(-1.0), -0.15);
        assert_eq!(e.acceleration_modifier(5.0), 0.30);
        // cooling: 10 now vs 40 before -> round(10 * 2 * 0.85) = 17
        let s = e.score(10.0, 40.0);
        assert_eq!(s.score, 17.0);
        assert_eq!(s.direction, Direction::Cooling);
    }

    #[test]
    fn test_direction_band() {
        let e = engine();
        assert_eq!(e.score(11.0, 10.0).direction, Direction::Stable);
        assert_eq!(e.score(9.0, 10.0).direction, Direction::Stable);
        assert_eq!(e.score(12.0, 10.0).direction, Direction::Rising);
        assert_eq!(e.score(8.0, 10.0).direction, Direction::Cooling);
    }

    #[test]
    fn test_score_is_non_negative() {
        let e = engine();
        for current in 0..60 {
            for prior in 0..60 {
                assert!(e.score(current as f64, prior as f64).score >= 0.0);
            }
        }
        assert_eq!(e.score(-5.0, f64::NAN).score, 0.0);
    }

    #[test]
    fn test_monotonic_in_current_count() {
        let e = engine();
        for prior in [0.0, 1.0, 5.0, 20.0, 100.0] {
            let mut last = 0.0;
            for current in 0..300 {
                let s = e.score(current as f64 * 0.5, prior).score;
                assert!(s >= last, "score fell at current={} prior={}", current, prior);
                last = s;
            }
        }
    }

    #[test]
    fn test_level_thresholds() {
        let e = engine();
        assert_eq!(e.level_for(9.9), ThreatLevel::Low);
        assert_eq!(e.level_for(10.0), ThreatLevel::Elevated);
        assert_eq!(e.level_for(30.0), ThreatLevel::High);
        assert_eq!(e.level_for(60.0), ThreatLevel::Critical);
    }
}
