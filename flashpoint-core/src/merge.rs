//! Source merger - upgrade-only combination of primary records and hints

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::{CanonicalEntity, ConflictState, CountryResolver, HintProvider, SeverityHint, ThreatLevel, ThreatRecord};

/// All hints returned by one secondary provider in one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintBatch {
    pub provider: HintProvider,
    pub hints: Vec<SeverityHint>,
}

impl HintBatch {
    pub fn new(provider: HintProvider, hints: Vec<SeverityHint>) -> Self {
        Self { provider, hints }
    }

    pub fn empty(provider: HintProvider) -> Self {
        Self::new(provider, Vec::new())
    }
}

/// Merge secondary hints into the primary record set.
///
/// Batches are applied in `HINT_PRECEDENCE` order regardless of the order
/// they are passed in. A hint may raise an existing record's level or add a
/// hint-only record in the escalating state; it never lowers a level.
pub fn merge(
    primary: Vec<ThreatRecord>,
    batches: &[HintBatch],
    resolver: &CountryResolver,
) -> BTreeMap<String, ThreatRecord> {
    let mut merged: BTreeMap<String, ThreatRecord> = BTreeMap::new();
    for record in primary {
        // keep the stronger duplicate
        let stronger = merged
            .get(&record.id)
            .map_or(true, |existing| (record.level, record.score) > (existing.level, existing.score));
        if stronger {
            merged.insert(record.id.clone(), record);
        }
    }

    let mut ordered: Vec<&HintBatch> = batches.iter().collect();
    ordered.sort_by_key(|b| b.provider.precedence());

    for batch in ordered {
        let tag = batch.provider.tag();

        // one hint per entity per provider, strongest level wins
        let mut strongest: BTreeMap<&'static str, (ThreatLevel, &'static CanonicalEntity)> = BTreeMap::new();
        for hint in &batch.hints {
            let Some(entity) = resolver.resolve(&hint.entity_text) else {
                continue;
            };
            strongest
                .entry(entity.id)
                .and_modify(|(level, _)| *level = (*level).max(hint.level))
                .or_insert((hint.level, entity));
        }

        let mut upgraded = 0usize;
        let mut added = 0usize;
        for (id, (level, entity)) in strongest {
            match merged.get_mut(id) {
                Some(record) => {
                    if level > record.level {
                        record.level = level;
                        upgraded += 1;
                    }
                    record.tag(tag);
                }
                None => {
                    let mut record = ThreatRecord::for_entity(entity, level, ConflictState::Escalating);
                    record.tag(tag);
                    merged.insert(id.to_string(), record);
                    added += 1;
                }
            }
        }

        debug!(
            "Merged {} hints from {}: {} upgraded, {} added",
            batch.hints.len(),
            tag,
            upgraded,
            added
        );
    }

    merged
}
