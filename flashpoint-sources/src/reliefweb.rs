//! ReliefWeb adapter - humanitarian reports as severity hints
//!
//! Reports created in the last 24 hours with a conflict-related theme are
//! counted per country. Every named country gets an elevated hint, upgraded
//! to high once enough reports name it.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use flashpoint_core::{Clock, HintProvider, SeverityHint, SystemClock, ThreatLevel};
use flashpoint_net::{create_client, fetch_text, FetchConfig};

use crate::{HintSource, SourceError};

pub const RELIEFWEB_ENDPOINT: &str = "https://api.reliefweb.int/v1/reports";

/// Theme names counted as conflict-related
const CONFLICT_THEMES: &[&str] = &[
    "conflict and violence",
    "violence and conflict",
    "armed conflict",
    "armed clashes",
];

/// Substrings that mark a theme as conflict-related
const CONFLICT_THEME_TERMS: &[&str] = &["conflict", "violence", "war", "armed", "attack", "security"];

/// Configuration for the ReliefWeb adapter
#[derive(Debug, Clone)]
pub struct ReliefWebConfig {
    /// Application name sent with every request
    pub appname: String,
    pub limit: usize,
    /// Reports per country needed for a high hint
    pub high_report_count: usize,
    pub lookback_hours: i64,
    pub endpoint: String,
}

impl Default for ReliefWebConfig {
    fn default() -> Self {
        Self {
            appname: "flashpoint".to_string(),
            limit: 50,
            high_report_count: 5,
            lookback_hours: 24,
            endpoint: RELIEFWEB_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReliefWebResponse {
    #[serde(default)]
    data: Vec<Report>,
}

#[derive(Debug, Deserialize)]
struct Report {
    #[serde(default)]
    fields: ReportFields,
}

#[derive(Debug, Default, Deserialize)]
struct ReportFields {
    #[serde(default)]
    date: Option<ReportDate>,
    #[serde(default)]
    theme: Vec<Named>,
    #[serde(default)]
    country: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct ReportDate {
    created: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

/// Check whether any theme name is conflict-related
pub fn is_conflict_theme(theme: &str) -> bool {
    let lower = theme.to_lowercase();
    CONFLICT_THEMES.contains(&lower.as_str()) || CONFLICT_THEME_TERMS.iter().any(|t| lower.contains(t))
}

/// Normalize a ReliefWeb response body into per-country hints, ordered by country name
pub fn parse_reliefweb_response(
    body: &str,
    now: DateTime<Utc>,
    config: &ReliefWebConfig,
) -> Result<Vec<SeverityHint>, SourceError> {
    let response: ReliefWebResponse = serde_json::from_str(body)?;
    let cutoff = now - Duration::hours(config.lookback_hours);

    let mut per_country: BTreeMap<String, usize> = BTreeMap::new();
    for report in response.data {
        let fields = report.fields;
        let Some(created) = fields
            .date
            .and_then(|d| d.created)
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
        else {
            continue;
        };
        if created < cutoff || !fields.theme.iter().any(|t| is_conflict_theme(&t.name)) {
            continue;
        }
        for country in fields.country {
            let name = country.name.trim();
            if !name.is_empty() {
                *per_country.entry(name.to_string()).or_default() += 1;
            }
        }
    }

    Ok(per_country
        .into_iter()
        .map(|(country, reports)| {
            let level = if reports >= config.high_report_count {
                ThreatLevel::High
            } else {
                ThreatLevel::Elevated
            };
            SeverityHint::new(country, level)
        })
        .collect())
}

/// Adapter for the ReliefWeb reports API
pub struct ReliefWebSource {
    config: ReliefWebConfig,
    fetch: FetchConfig,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl ReliefWebSource {
    pub fn new(config: ReliefWebConfig, fetch: FetchConfig) -> Result<Self, SourceError> {
        let client = create_client(&fetch)?;
        Ok(Self {
            config,
            fetch,
            client,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn request_url(&self) -> String {
        format!(
            "{}?appname={}&limit={}&fields[include][]=date&fields[include][]=title&fields[include][]=theme&fields[include][]=country&sort[]=date.created:desc",
            self.config.endpoint,
            urlencoding::encode(&self.config.appname),
            self.config.limit
        )
    }
}

#[async_trait]
impl HintSource for ReliefWebSource {
    fn provider(&self) -> HintProvider {
        HintProvider::ReliefWeb
    }

    async fn try_fetch_hints(&self) -> Result<Vec<SeverityHint>, SourceError> {
        let body = fetch_text(&self.client, &self.request_url(), &self.fetch).await?;
        parse_reliefweb_response(&body, self.clock.now(), &self.config)
    }
}
