//! Conflict headline adapter - news RSS items as unweighted events
//!
//! Headlines carry no coordinates; the aggregator places them at the
//! resolved entity's reference point.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use tracing::debug;

use flashpoint_core::{RawEvent, TimeWindow};
use flashpoint_net::{create_client, fetch_feeds, truncate_chars, FeedItem, FetchConfig};

use crate::{EventSource, SourceError};

/// Default conflict headline feeds
pub const HEADLINE_FEEDS: &[&str] = &["https://www.aljazeera.com/xml/rss/subjects/conflict.xml"];

/// Titles containing these are reviews, retrospectives or commentary, not events
pub const NOISE_KEYWORDS: &[&str] = &[
    "book",
    "novel",
    "documentary",
    "film",
    "anniversary",
    "museum",
    "exhibition",
    "history of",
    "memoir",
    "biography",
    "podcast",
    "interview",
    "review",
    "analysis",
    "retrospective",
    "explainer",
    "opinion",
    "op-ed",
];

/// Length of the lowercase title prefix used for deduplication
const DEDUP_PREFIX_CHARS: usize = 60;

/// Check whether a headline is non-event noise
pub fn is_noise(title: &str) -> bool {
    let lower = title.to_lowercase();
    NOISE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Convert feed items into events inside `window`.
///
/// Undated items count as published at fetch time, the end of `window`.
/// Noise headlines and repeated titles are dropped.
pub fn events_from_items(items: Vec<FeedItem>, window: &TimeWindow) -> Vec<RawEvent> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut events = Vec::new();

    for item in items {
        let published = item.published.unwrap_or_else(|| window.last_instant());
        if !window.contains(published) || is_noise(&item.title) {
            continue;
        }

        let key = truncate_chars(&item.title.to_lowercase(), DEDUP_PREFIX_CHARS).to_string();
        if !seen.insert(key) {
            continue;
        }

        let text = if item.summary.is_empty() {
            item.title
        } else {
            format!("{} {}", item.title, item.summary)
        };
        events.push(RawEvent::new(text, published));
    }

    events
}

/// Adapter over one or more conflict news feeds
pub struct HeadlineSource {
    feeds: Vec<String>,
    fetch: FetchConfig,
    client: Client,
}

impl HeadlineSource {
    pub fn new(fetch: FetchConfig) -> Result<Self, SourceError> {
        Self::with_feeds(HEADLINE_FEEDS.iter().map(|s| s.to_string()).collect(), fetch)
    }

    pub fn with_feeds(feeds: Vec<String>, fetch: FetchConfig) -> Result<Self, SourceError> {
        let client = create_client(&fetch)?;
        Ok(Self { feeds, fetch, client })
    }
}

#[async_trait]
impl EventSource for HeadlineSource {
    fn name(&self) -> &str {
        "headlines"
    }

    async fn try_fetch_events(&self, window: &TimeWindow) -> Result<Vec<RawEvent>, SourceError> {
        let urls: Vec<&str> = self.feeds.iter().map(String::as_str).collect();
        let items = fetch_feeds(&self.client, &urls, &self.fetch, urls.len()).await?;
        let total = items.len();
        let events = events_from_items(items, window);
        debug!("headlines: {} of {} items kept", events.len(), total);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 8, 0, 0, 0).unwrap()
    }

    fn item(title: &str, summary: &str, age_days: i64) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            summary: summary.to_string(),
            published: Some(now() - Duration::days(age_days)),
            ..Default::default()
        }
    }

    #[test]
    fn test_noise_filter() {
        assert!(is_noise("Book review: a history of the Sudan war"));
        assert!(is_noise("OPINION: Why Gaza matters"));
        assert!(!is_noise("Drone strikes hit Port Sudan"));
    }

    #[test]
    fn test_events_from_items() {
        let window = TimeWindow::new(now() - Duration::days(7), now());
        let items = vec![
            item("Drone strikes hit Port Sudan", "Airport targeted.", 1),
            item("Drone strikes hit Port Sudan", "Duplicate from second feed.", 1),
            item("Documentary revisits Mosul", "", 2),
            item("Clashes in Goma", "", 10),
            FeedItem {
                title: "Undated item about Haiti".to_string(),
                ..Default::default()
            },
        ];

        let events = events_from_items(items, &window);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].entity_text, "Drone strikes hit Port Sudan Airport targeted.");
        assert_eq!(events[0].weight, 1.0);
        assert_eq!(events[0].coordinates(), None);

        // undated: stamped at fetch time, still inside the window
        assert_eq!(events[1].entity_text, "Undated item about Haiti");
        assert!(window.contains(events[1].occurred_at));
        assert!(events[1].occurred_at > now() - Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_unreachable_feeds_are_an_error() {
        let source = HeadlineSource::with_feeds(
            vec!["http://127.0.0.1:1/rss".to_string()],
            FetchConfig::default().with_timeout(2).with_retries(0),
        )
        .unwrap();
        let window = TimeWindow::new(now() - Duration::days(7), now());

        assert!(source.try_fetch_events(&window).await.is_err());
        assert!(source.fetch_events(&window).await.is_empty());
    }

    #[test]
    fn test_dedup_uses_title_prefix() {
        let window = TimeWindow::new(now() - Duration::days(7), now());
        let long = "A".repeat(60);
        let items = vec![
            item(&format!("{} first ending", long), "", 1),
            item(&format!("{} second ending", long.to_lowercase()), "", 2),
        ];
        assert_eq!(events_from_items(items, &window).len(), 1);
    }
}
