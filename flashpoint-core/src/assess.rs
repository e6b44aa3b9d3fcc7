//! Assessment - turn window signals and seed baselines into threat records
//!
//! Within one call decay runs strictly before reinforcement, and
//! reinforcement strictly before classification.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    entity_by_id, CanonicalEntity, ConflictState, CountrySignal, DecayTracker, Score, ScoringEngine, StateThresholds,
    ThreatRecord,
};

/// Everything needed to classify one cycle
pub struct Assessment<'a> {
    pub engine: &'a ScoringEngine,
    pub states: &'a StateThresholds,
    pub window_days: i64,
}

impl<'a> Assessment<'a> {
    pub fn new(engine: &'a ScoringEngine, states: &'a StateThresholds, window_days: i64) -> Self {
        Self {
            engine,
            states,
            window_days,
        }
    }

    /// Build the primary record set, unsorted and before hint merging.
    ///
    /// Entities with live signals are emitted when at least escalating; seed
    /// entities without live signals are emitted only while their decayed
    /// baseline keeps them active.
    pub fn run(
        &self,
        current: &BTreeMap<&'static str, CountrySignal>,
        prior: &BTreeMap<&'static str, CountrySignal>,
        tracker: &mut DecayTracker,
        now: DateTime<Utc>,
    ) -> Vec<ThreatRecord> {
        tracker.decay(now);

        let mut records = Vec::new();
        let live: BTreeSet<&'static str> = current.keys().chain(prior.keys()).copied().collect();

        for id in &live {
            let cur = current.get(id);
            let pri = prior.get(id);
            let Some(entity) = cur.or(pri).map(|s| s.entity) else {
                continue;
            };

            let fresh = self.engine.score(
                cur.map_or(0.0, |s| s.window_event_count),
                pri.map_or(0.0, |s| s.window_event_count),
            );
            let baseline = tracker.reinforce(id, fresh.score);
            let score = baseline.map_or(fresh.score, |b| b.max(fresh.score));

            let state = ConflictState::from_score(score, self.states);
            if state == ConflictState::Inactive {
                continue;
            }

            let mut record = self.build(entity, &fresh, score, state);
            if let Some(signal) = cur {
                record.lat = signal.best_lat;
                record.lon = signal.best_lon;
                record.recent_event_count = signal.window_event_count;
            }
            record.last_event_at = cur.or(pri).map(|s| s.last_event_at);
            record.description = self.describe(entity, &fresh, record.recent_event_count, score > fresh.score);
            records.push(record);
        }

        let idle = self.engine.score(0.0, 0.0);
        for baseline in tracker.baselines() {
            if live.contains(baseline.entity_id) {
                continue;
            }
            let state = ConflictState::from_score(baseline.score, self.states);
            if state != ConflictState::Active {
                continue;
            }
            let Some(entity) = entity_by_id(baseline.entity_id) else {
                continue;
            };
            let mut record = self.build(entity, &idle, baseline.score, state);
            record.description = self.describe(entity, &idle, 0.0, true);
            records.push(record);
        }

        records
    }

    fn build(&self, entity: &CanonicalEntity, fresh: &Score, score: f64, state: ConflictState) -> ThreatRecord {
        let mut record = ThreatRecord::for_entity(entity, self.engine.level_for(score), state);
        record.score = score;
        record.direction = fresh.direction;
        record.acceleration_pct = fresh.acceleration_pct;
        record
    }

    fn describe(&self, entity: &CanonicalEntity, fresh: &Score, events: f64, sustained: bool) -> String {
        let mut text = format!(
            "{}: {} events in the last {} days ({:+}% vs prior window)",
            entity.name, events, self.window_days, fresh.acceleration_pct
        );
        if sustained {
            text.push_str(" · sustained");
        }
        text
    }
}
