//! Static fallback list, served only when no event source produced a usable event

use flashpoint_core::{entities_in_tier, sort_records, ConflictState, ConflictTier, ThreatLevel, ThreatRecord};

/// Conflict index tiers and the level each is served at
const FALLBACK_TIERS: &[(ConflictTier, ThreatLevel)] = &[
    (ConflictTier::Extreme, ThreatLevel::Critical),
    (ConflictTier::High, ThreatLevel::High),
];

/// The conflict index as active records at their tier's default level
pub fn fallback_records() -> Vec<ThreatRecord> {
    let mut records: Vec<ThreatRecord> = FALLBACK_TIERS
        .iter()
        .flat_map(|&(tier, level)| entities_in_tier(tier).map(move |entity| (entity, level)))
        .map(|(entity, level)| {
            let mut record = ThreatRecord::for_entity(entity, level, ConflictState::Active);
            record.description = format!("{}: ongoing conflict (static baseline)", entity.name);
            record
        })
        .collect();
    sort_records(&mut records);
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_covers_conflict_index() {
        let records = fallback_records();
        assert_eq!(records.len(), 50);
        assert_eq!(records.iter().filter(|r| r.level == ThreatLevel::Critical).count(), 10);
        assert_eq!(records.iter().filter(|r| r.level == ThreatLevel::High).count(), 40);
        assert!(records.iter().all(|r| r.id != "kashmir"));
        assert!(records.iter().all(|r| r.conflict_state == ConflictState::Active));
        assert!(records.iter().all(|r| r.score == 0.0 && r.recent_event_count == 0.0));
    }

    #[test]
    fn test_fallback_is_sorted_and_stable() {
        let records = fallback_records();
        assert!(records.windows(2).all(|w| w[0].level >= w[1].level));

        let critical: Vec<&str> = records
            .iter()
            .filter(|r| r.level == ThreatLevel::Critical)
            .map(|r| r.id.as_str())
            .collect();
        let mut sorted = critical.clone();
        sorted.sort();
        assert_eq!(critical, sorted);

        assert_eq!(records, fallback_records());
    }
}
