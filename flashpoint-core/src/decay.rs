//! Decay tracker - seed baselines that persist through quiet windows
//!
//! A fixed list of long-running entities is seeded with an initial score.
//! Every cycle the baselines decay by whole elapsed intervals of wall-clock
//! time and are then reinforced upward by any fresh live score.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{entity_by_id, DecayConfig, SEED_ENTITY_IDS};

/// Floating baseline for one seed entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedBaseline {
    pub entity_id: &'static str,
    pub score: f64,
    pub last_decay_applied_at: DateTime<Utc>,
}

/// Process-lifetime map of entity id to seed baseline
#[derive(Debug, Clone)]
pub struct DecayTracker {
    config: DecayConfig,
    baselines: BTreeMap<&'static str, SeedBaseline>,
    /// Advanced only by whole intervals
    last_applied_at: DateTime<Utc>,
}

impl DecayTracker {
    /// Seed the given entity ids; ids missing from the entity table are skipped
    pub fn seeded(ids: &[&str], config: DecayConfig, now: DateTime<Utc>) -> Self {
        let mut baselines = BTreeMap::new();
        for id in ids {
            match entity_by_id(id) {
                Some(entity) => {
                    baselines.insert(
                        entity.id,
                        SeedBaseline {
                            entity_id: entity.id,
                            score: config.seed_score.max(0.0),
                            last_decay_applied_at: now,
                        },
                    );
                }
                None => warn!("Unknown seed entity '{}', skipping", id),
            }
        }

        Self {
            config,
            baselines,
            last_applied_at: now,
        }
    }

    /// Tracker over the curated default seed list
    pub fn with_default_seeds(config: DecayConfig, now: DateTime<Utc>) -> Self {
        Self::seeded(SEED_ENTITY_IDS, config, now)
    }

    pub fn config(&self) -> &DecayConfig {
        &self.config
    }

    pub fn last_applied_at(&self) -> DateTime<Utc> {
        self.last_applied_at
    }

    pub fn baseline(&self, id: &str) -> Option<&SeedBaseline> {
        self.baselines.get(id)
    }

    /// Baselines in entity id order
    pub fn baselines(&self) -> impl Iterator<Item = &SeedBaseline> {
        self.baselines.values()
    }

    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }

    /// Apply decay for every whole interval elapsed since the last application.
    ///
    /// Returns the number of intervals applied. The tracker clock advances by
    /// exactly `intervals * interval`, so calling this repeatedly within one
    /// interval is a no-op.
    pub fn decay(&mut self, now: DateTime<Utc>) -> i64 {
        let interval = self.config.interval_secs.max(1);
        let elapsed = (now - self.last_applied_at).num_seconds();
        if elapsed < interval {
            return 0;
        }

        let intervals = elapsed / interval;
        let factor = self.config.rate.powf(intervals as f64);
        self.last_applied_at += Duration::seconds(intervals * interval);

        for baseline in self.baselines.values_mut() {
            baseline.score = (baseline.score * factor).max(0.0);
            baseline.last_decay_applied_at = self.last_applied_at;
        }

        debug!(
            "Decayed {} baselines by {} interval(s), factor {:.4}",
            self.baselines.len(),
            intervals,
            factor
        );
        intervals
    }

    /// Raise a tracked baseline to `fresh_score` if that is higher.
    ///
    /// Returns the resulting baseline score, or `None` for untracked entities.
    pub fn reinforce(&mut self, id: &str, fresh_score: f64) -> Option<f64> {
        let baseline = self.baselines.get_mut(id)?;
        if fresh_score.is_finite() && fresh_score > baseline.score {
            baseline.score = fresh_score;
        }
        Some(baseline.score)
    }

    /// Whole intervals needed for `start` to decay below `threshold`
    pub fn intervals_until_below(&self, start: f64, threshold: f64) -> Option<u64> {
        if start < threshold {
            return Some(0);
        }
        if threshold <= 0.0 || self.config.rate >= 1.0 {
            return None;
        }
        let exact = (threshold / start).ln() / self.config.rate.ln();
        let mut n = exact.ceil().max(0.0) as u64;
        // guard against ln rounding landing exactly on the threshold
        while start * self.config.rate.powf(n as f64) >= threshold {
            n += 1;
        }
        Some(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn tracker() -> DecayTracker {
        DecayTracker::seeded(&["sudan", "haiti"], DecayConfig::default(), t0())
    }

    #[test]
    fn test_seeding() {
        let t = DecayTracker::with_default_seeds(DecayConfig::default(), t0());
        assert_eq!(t.len(), SEED_ENTITY_IDS.len());
        assert!(t.baselines().all(|b| b.score == 25.0));

        let partial = DecayTracker::seeded(&["sudan", "atlantis"], DecayConfig::default(), t0());
        assert_eq!(partial.len(), 1);
    }

    #[test]
    fn test_decay_is_idempotent_without_elapsed_time() {
        let mut t = tracker();
        t.decay(t0() + Duration::days(3));
        let once = t.baseline("sudan").cloned();
        assert_eq!(t.decay(t0() + Duration::days(3)), 0);
        assert_eq!(t.baseline("sudan").cloned(), once);
    }

    #[test]
    fn test_partial_intervals_do_not_drift() {
        let mut stepwise = tracker();
        for hour in 1..=72 {
            stepwise.decay(t0() + Duration::hours(hour));
        }
        let mut single = tracker();
        single.decay(t0() + Duration::hours(72));

        assert_eq!(stepwise.last_applied_at(), t0() + Duration::days(3));
        let a = stepwise.baseline("sudan").map(|b| b.score).unwrap();
        let b = single.baseline("sudan").map(|b| b.score).unwrap();
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_thirty_day_scenario() {
        let mut t = tracker();
        t.decay(t0() + Duration::days(30));
        let day30 = t.baseline("sudan").unwrap().score;
        assert!(day30 > 10.0 && day30 < 10.1, "got {}", day30);

        t.decay(t0() + Duration::days(31));
        let day31 = t.baseline("sudan").unwrap().score;
        assert!(day31 < 10.0 && day31 > 9.7, "got {}", day31);
        assert_eq!(t.baseline("sudan").unwrap().last_decay_applied_at, t0() + Duration::days(31));
    }

    #[test]
    fn test_convergence_is_bounded() {
        let t = tracker();
        assert_eq!(t.intervals_until_below(25.0, 10.0), Some(31));
        assert_eq!(t.intervals_until_below(5.0, 10.0), Some(0));

        let stuck = DecayTracker::seeded(
            &["sudan"],
            DecayConfig {
                rate: 1.0,
                ..Default::default()
            },
            t0(),
        );
        assert_eq!(stuck.intervals_until_below(25.0, 10.0), None);
    }

    #[test]
    fn test_reinforce_never_lowers() {
        let mut t = tracker();
        assert_eq!(t.reinforce("sudan", 12.0), Some(25.0));
        assert_eq!(t.reinforce("sudan", 40.0), Some(40.0));
        assert_eq!(t.reinforce("sudan", f64::NAN), Some(40.0));
        assert_eq!(t.reinforce("ukraine", 90.0), None);
    }

    #[test]
    fn test_decay_then_reinforce_keeps_fresh_evidence() {
        let mut t = tracker();
        t.decay(t0() + Duration::days(60));
        assert!(t.baseline("haiti").unwrap().score < 10.0);
        assert_eq!(t.reinforce("haiti", 18.0), Some(18.0));
    }
}
