//! Observations flowing into the engine and the threat records flowing out
//!
//! Raw observations are ephemeral: adapters produce them, the aggregator
//! consumes them once. Country signals and threat records are rebuilt from
//! scratch every cycle and never mutated across cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CanonicalEntity, LevelThresholds, StateThresholds};

/// Discrete severity level, ordered low < elevated < high < critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    #[default]
    Low,
    Elevated,
    High,
    Critical,
}

impl ThreatLevel {
    /// Classify a score against fixed level thresholds
    pub fn from_score(score: f64, thresholds: &LevelThresholds) -> Self {
        if score >= thresholds.critical {
            ThreatLevel::Critical
        } else if score >= thresholds.high {
            ThreatLevel::High
        } else if score >= thresholds.elevated {
            ThreatLevel::Elevated
        } else {
            ThreatLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "low",
            ThreatLevel::Elevated => "elevated",
            ThreatLevel::High => "high",
            ThreatLevel::Critical => "critical",
        }
    }
}

/// Trend of an entity between the prior and current window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Rising,
    #[default]
    Stable,
    Cooling,
}

/// Activity state of an entity, ordered inactive < escalating < active
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictState {
    Inactive,
    Escalating,
    Active,
}

impl ConflictState {
    /// Classify a score; monotonic in `score`
    pub fn from_score(score: f64, thresholds: &StateThresholds) -> Self {
        if score >= thresholds.active {
            ConflictState::Active
        } else if score >= thresholds.escalating {
            ConflictState::Escalating
        } else {
            ConflictState::Inactive
        }
    }
}

/// One point-in-time observation from an event provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Free-text location mention, resolved later
    pub entity_text: String,
    pub occurred_at: DateTime<Utc>,
    /// Contribution to the window count
    pub weight: f64,
    /// Event coordinates when the provider supplies them
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl RawEvent {
    pub fn new(entity_text: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            entity_text: entity_text.into(),
            occurred_at,
            weight: 1.0,
            lat: None,
            lon: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight.max(0.0);
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        if lat.is_finite() && lon.is_finite() && lat.abs() <= 90.0 && lon.abs() <= 180.0 {
            self.lat = Some(lat);
            self.lon = Some(lon);
        }
        self
    }

    /// Coordinates if both halves are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}

/// Secondary providers, listed in the order their hints are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HintProvider {
    /// Long-running conflict trackers (International Crisis Group, Army Recognition)
    CrisisWatch,
    /// Humanitarian situation reports (ReliefWeb)
    ReliefWeb,
}

/// Fixed merge order for secondary providers
pub const HINT_PRECEDENCE: [HintProvider; 2] = [HintProvider::CrisisWatch, HintProvider::ReliefWeb];

impl HintProvider {
    /// Provenance tag appended to record descriptions
    pub fn tag(&self) -> &'static str {
        match self {
            HintProvider::CrisisWatch => "crisis-watch",
            HintProvider::ReliefWeb => "reliefweb",
        }
    }

    /// Position in the merge order
    pub fn precedence(&self) -> usize {
        HINT_PRECEDENCE
            .iter()
            .position(|p| p == self)
            .unwrap_or(HINT_PRECEDENCE.len())
    }
}

/// Coarse per-entity classification from a secondary provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityHint {
    pub entity_text: String,
    pub level: ThreatLevel,
}

impl SeverityHint {
    pub fn new(entity_text: impl Into<String>, level: ThreatLevel) -> Self {
        Self {
            entity_text: entity_text.into(),
            level,
        }
    }
}

/// Per-entity aggregate for one time window
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySignal {
    pub entity: &'static CanonicalEntity,
    /// Summed event weights
    pub window_event_count: f64,
    /// Coordinates of the heaviest event seen
    pub best_lat: f64,
    pub best_lon: f64,
    pub last_event_at: DateTime<Utc>,
}

/// Output record, one per canonical entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatRecord {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub level: ThreatLevel,
    pub score: f64,
    pub direction: Direction,
    pub acceleration_pct: f64,
    pub recent_event_count: f64,
    pub last_event_at: Option<DateTime<Utc>>,
    pub conflict_state: ConflictState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    pub description: String,
}

impl ThreatRecord {
    /// Bare record for an entity with no live evidence
    pub fn for_entity(entity: &CanonicalEntity, level: ThreatLevel, state: ConflictState) -> Self {
        Self {
            id: entity.id.to_string(),
            name: entity.name.to_string(),
            lat: entity.lat,
            lon: entity.lon,
            level,
            score: 0.0,
            direction: Direction::Stable,
            acceleration_pct: 0.0,
            recent_event_count: 0.0,
            last_event_at: None,
            conflict_state: state,
            country_code: entity.country_code.map(str::to_string),
            description: entity.name.to_string(),
        }
    }

    /// Append a provenance tag to the description
    pub fn tag(&mut self, tag: &str) {
        self.description.push_str(" · ");
        self.description.push_str(tag);
    }
}

/// Order records by level descending, then score descending, then id
pub fn sort_records(records: &mut [ThreatRecord]) {
    records.sort_by(|a, b| {
        b.level
            .cmp(&a.level)
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| a.id.cmp(&b.id))
    });
}
