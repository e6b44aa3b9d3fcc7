//! Crisis watch adapter - named long-running conflicts from tracker feeds
//!
//! A conflict from the catalogue yields a hint only while the tracker
//! feeds have mentioned it within the last 30 days.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use regex::{Regex, RegexBuilder};
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use flashpoint_core::{Clock, HintProvider, SeverityHint, SystemClock, ThreatLevel};
use flashpoint_net::{create_client, fetch_feeds, FeedItem, FetchConfig};

use crate::{HintSource, SourceError};

/// Conflict tracker feeds (International Crisis Group, Army Recognition)
pub const TRACKER_FEEDS: &[&str] = &[
    "https://www.crisisgroup.org/rss-0",
    "https://www.armyrecognition.com/focus-analysis-conflicts/army/conflicts-in-the-world/feed/rss",
];

/// How long a mention keeps a conflict on the list
pub const MENTION_TTL_DAYS: i64 = 30;

/// A named conflict the trackers are watched for
#[derive(Debug)]
pub struct TrackedConflict {
    pub name: &'static str,
    /// Location text handed to the resolver
    pub location: &'static str,
    pub pattern: &'static str,
    pub level: ThreatLevel,
}

pub static TRACKED_CONFLICTS: &[TrackedConflict] = &[
    TrackedConflict {
        name: "Russia-Ukraine War",
        location: "Ukraine",
        pattern: r"russia.{0,15}ukraine|ukraine.{0,15}russia|war in ukraine",
        level: ThreatLevel::High,
    },
    TrackedConflict {
        name: "Sudan Civil War",
        location: "Sudan",
        pattern: r"sudan.{0,15}civil|sudanese.{0,10}war|\brsf\b.{0,10}\bsaf\b|\bsaf\b.{0,10}\brsf\b",
        level: ThreatLevel::High,
    },
    TrackedConflict {
        name: "Israel-Gaza War",
        location: "Gaza",
        pattern: r"\bgaza|israel.{0,15}hamas|hamas.{0,15}israel",
        level: ThreatLevel::High,
    },
    TrackedConflict {
        name: "Yemen Civil War",
        location: "Yemen",
        pattern: r"yemen.{0,10}civil|houthi|huthi",
        level: ThreatLevel::High,
    },
    TrackedConflict {
        name: "DRC - M23 Conflict",
        location: "DR Congo",
        pattern: r"congo.{0,10}m23|m23.{0,10}congo|\bdrc\b.{0,10}rebel|eastern.{0,10}congo",
        level: ThreatLevel::High,
    },
    TrackedConflict {
        name: "Ethiopian Civil Conflict",
        location: "Ethiopia",
        pattern: r"ethiopia.{0,15}conflict|oromo.{0,10}liberation|fano.{0,10}militia|amhara.{0,10}conflict",
        level: ThreatLevel::High,
    },
    TrackedConflict {
        name: "Myanmar Civil War",
        location: "Myanmar",
        pattern: r"myanmar.{0,10}civil|myanmar.{0,10}military|myanmar.{0,10}coup|burma.{0,10}conflict",
        level: ThreatLevel::Elevated,
    },
    TrackedConflict {
        name: "Haiti Gang Crisis",
        location: "Haiti",
        pattern: r"haiti.{0,10}gang|haiti.{0,10}violence|haiti.{0,10}crisis",
        level: ThreatLevel::Elevated,
    },
    TrackedConflict {
        name: "Cameroon Anglophone Conflict",
        location: "Cameroon",
        pattern: r"cameroon.{0,15}anglophone|ambaz",
        level: ThreatLevel::Elevated,
    },
    TrackedConflict {
        name: "Colombia Armed Groups",
        location: "Colombia",
        pattern: r"colombia.{0,10}farc|farc.{0,10}colombia|\beln\b.{0,10}colombia",
        level: ThreatLevel::Elevated,
    },
    TrackedConflict {
        name: "Mexico Drug War",
        location: "Mexico",
        pattern: r"mexico.{0,10}cartel|cartel.{0,10}mexico|drug.{0,10}war.{0,10}mexico",
        level: ThreatLevel::Elevated,
    },
    TrackedConflict {
        name: "South Sudan Tensions",
        location: "South Sudan",
        pattern: r"south\s*sudan.{0,15}(conflict|civil|tension)",
        level: ThreatLevel::Elevated,
    },
    TrackedConflict {
        name: "Kashmir Tensions",
        location: "Kashmir",
        pattern: r"kashmir.{0,10}conflict|india.{0,15}pakistan.{0,15}kashmir",
        level: ThreatLevel::Low,
    },
    TrackedConflict {
        name: "Sahel Insurgency",
        location: "Burkina Faso",
        pattern: r"sahel.{0,10}jihadis|burkina.{0,10}islamist|mali.{0,10}jihadist|niger.{0,10}insurgency",
        level: ThreatLevel::Elevated,
    },
    TrackedConflict {
        name: "Somalia - Al-Shabaab",
        location: "Somalia",
        pattern: r"somalia.{0,10}al.shabaab|shabaab.{0,10}somalia",
        level: ThreatLevel::Elevated,
    },
];

static TRACKED_MATCHERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TRACKED_CONFLICTS
        .iter()
        .map(|c| {
            RegexBuilder::new(c.pattern)
                .case_insensitive(true)
                .build()
                .unwrap()
        })
        .collect()
});

/// Turn tracker feed items into hints for conflicts mentioned recently.
///
/// Undated items count as mentioned `now`.
pub fn hints_from_items(items: &[FeedItem], now: DateTime<Utc>) -> Vec<SeverityHint> {
    let mut last_seen: BTreeMap<usize, DateTime<Utc>> = BTreeMap::new();

    for item in items {
        let text = format!("{} {}", item.title, item.summary);
        let seen_at = item.published.unwrap_or(now);
        for (idx, matcher) in TRACKED_MATCHERS.iter().enumerate() {
            if matcher.is_match(&text) {
                let entry = last_seen.entry(idx).or_insert(seen_at);
                if seen_at > *entry {
                    *entry = seen_at;
                }
            }
        }
    }

    let ttl = Duration::days(MENTION_TTL_DAYS);
    last_seen
        .into_iter()
        .filter(|(_, seen_at)| now - *seen_at <= ttl)
        .map(|(idx, _)| {
            let conflict = &TRACKED_CONFLICTS[idx];
            SeverityHint::new(conflict.location, conflict.level)
        })
        .collect()
}

/// Adapter over the conflict tracker feeds
pub struct CrisisWatchSource {
    feeds: Vec<String>,
    fetch: FetchConfig,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl CrisisWatchSource {
    pub fn new(fetch: FetchConfig) -> Result<Self, SourceError> {
        let client = create_client(&fetch)?;
        Ok(Self {
            feeds: TRACKER_FEEDS.iter().map(|s| s.to_string()).collect(),
            fetch,
            client,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl HintSource for CrisisWatchSource {
    fn provider(&self) -> HintProvider {
        HintProvider::CrisisWatch
    }

    async fn try_fetch_hints(&self) -> Result<Vec<SeverityHint>, SourceError> {
        let urls: Vec<&str> = self.feeds.iter().map(String::as_str).collect();
        let items = fetch_feeds(&self.client, &urls, &self.fetch, urls.len()).await?;
        Ok(hints_from_items(&items, self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()
    }

    fn item(title: &str, age_days: Option<i64>) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            published: age_days.map(|d| now() - Duration::days(d)),
            ..Default::default()
        }
    }

    #[test]
    fn test_matchers_compile() {
        assert_eq!(TRACKED_MATCHERS.len(), TRACKED_CONFLICTS.len());
    }

    #[test]
    fn test_recent_mentions_become_hints() {
        let items = vec![
            item("Houthi missile launched at shipping", Some(2)),
            item("Haiti gang violence displaces thousands", Some(45)),
            item("Mexico cartel shootout in Sinaloa", None),
            item("Weather update", Some(1)),
        ];

        let hints = hints_from_items(&items, now());
        assert_eq!(hints.len(), 2);
        assert!(hints.contains(&SeverityHint::new("Yemen", ThreatLevel::High)));
        assert!(hints.contains(&SeverityHint::new("Mexico", ThreatLevel::Elevated)));
    }

    #[test]
    fn test_latest_mention_wins() {
        let items = vec![
            item("Haiti crisis deepens", Some(40)),
            item("Haiti gang leader arrested", Some(3)),
        ];
        let hints = hints_from_items(&items, now());
        assert_eq!(hints, vec![SeverityHint::new("Haiti", ThreatLevel::Elevated)]);
    }

    #[test]
    fn test_hint_locations_resolve() {
        let resolver = flashpoint_core::CountryResolver::conflict_zones();
        for conflict in TRACKED_CONFLICTS {
            assert!(
                resolver.resolve(conflict.location).is_some(),
                "{} does not resolve",
                conflict.location
            );
        }
    }
}
