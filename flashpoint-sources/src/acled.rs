//! ACLED adapter - geolocated armed conflict events
//!
//! Queries the ACLED read API for the window's date range. Each record
//! becomes one event carrying its own coordinates; battles and remote
//! violence weigh more than the other categories.

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use flashpoint_core::{RawEvent, TimeWindow};
use flashpoint_net::{create_client, fetch_text, FetchConfig};

use crate::{EventSource, SourceError};

pub const ACLED_ENDPOINT: &str = "https://api.acleddata.com/acled/read";

/// Event categories requested from ACLED
pub const ACLED_EVENT_TYPES: &[&str] = &[
    "Battles",
    "Explosions/Remote violence",
    "Violence against civilians",
    "Protests",
    "Riots",
    "Strategic developments",
];

const ACLED_FIELDS: &str = "country,latitude,longitude,event_type,event_date,location";

/// Configuration for the ACLED adapter
#[derive(Debug, Clone)]
pub struct AcledConfig {
    pub api_key: Option<String>,
    pub email: Option<String>,
    /// Maximum records per request
    pub limit: usize,
    pub endpoint: String,
}

impl Default for AcledConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("ACLED_API_KEY").ok().filter(|s| !s.is_empty()),
            email: std::env::var("ACLED_EMAIL").ok().filter(|s| !s.is_empty()),
            limit: 500,
            endpoint: ACLED_ENDPOINT.to_string(),
        }
    }
}

impl AcledConfig {
    pub fn with_credentials(mut self, api_key: Option<String>, email: Option<String>) -> Self {
        self.api_key = api_key.filter(|s| !s.is_empty());
        self.email = email.filter(|s| !s.is_empty());
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.email.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct AcledResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<AcledRecord>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AcledRecord {
    #[serde(default)]
    country: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    latitude: serde_json::Value,
    #[serde(default)]
    longitude: serde_json::Value,
    #[serde(default)]
    event_type: String,
    #[serde(default)]
    event_date: String,
}

/// Adapter for the ACLED read API
pub struct AcledSource {
    config: AcledConfig,
    fetch: FetchConfig,
    client: Client,
}

impl AcledSource {
    pub fn new(config: AcledConfig, fetch: FetchConfig) -> Result<Self, SourceError> {
        let client = create_client(&fetch)?;
        Ok(Self { config, fetch, client })
    }

    fn request_url(&self, window: &TimeWindow, key: &str, email: &str) -> String {
        let start = window.start.format("%Y-%m-%d").to_string();
        let end = window.end.format("%Y-%m-%d").to_string();
        format!(
            "{}?key={}&email={}&event_date={}&event_date_where=BETWEEN&event_type={}&fields={}&limit={}",
            self.config.endpoint,
            urlencoding::encode(key),
            urlencoding::encode(email),
            urlencoding::encode(&format!("{}|{}", start, end)),
            urlencoding::encode(&ACLED_EVENT_TYPES.join("|")),
            urlencoding::encode(ACLED_FIELDS),
            self.config.limit
        )
    }
}

/// Event weight by ACLED category
pub fn event_weight(event_type: &str) -> f64 {
    match event_type {
        "Battles" | "Explosions/Remote violence" => 1.5,
        _ => 1.0,
    }
}

/// ACLED sends coordinates as strings or numbers depending on the endpoint version
fn coordinate(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Normalize an ACLED response body into raw events.
///
/// Records with unparseable dates or coordinates are discarded.
pub fn parse_acled_response(body: &str) -> Result<Vec<RawEvent>, SourceError> {
    let response: AcledResponse = serde_json::from_str(body)?;
    if !response.success {
        let reason = response
            .error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "success=false".to_string());
        return Err(SourceError::Upstream(reason));
    }

    let total = response.data.len();
    let events: Vec<RawEvent> = response
        .data
        .into_iter()
        .filter_map(|record| {
            let lat = coordinate(&record.latitude)?;
            let lon = coordinate(&record.longitude)?;
            let date = NaiveDate::parse_from_str(record.event_date.trim(), "%Y-%m-%d").ok()?;
            let occurred_at = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?);
            if record.country.is_empty() {
                return None;
            }

            let text = if record.location.is_empty() {
                record.country
            } else {
                format!("{}, {}", record.location, record.country)
            };
            Some(
                RawEvent::new(text, occurred_at)
                    .with_weight(event_weight(&record.event_type))
                    .with_coordinates(lat, lon),
            )
        })
        .collect();

    if events.len() < total {
        debug!("ACLED: discarded {} malformed records", total - events.len());
    }
    Ok(events)
}

#[async_trait]
impl EventSource for AcledSource {
    fn name(&self) -> &str {
        "acled"
    }

    async fn try_fetch_events(&self, window: &TimeWindow) -> Result<Vec<RawEvent>, SourceError> {
        let (Some(key), Some(email)) = (&self.config.api_key, &self.config.email) else {
            return Err(SourceError::NotConfigured("ACLED_API_KEY / ACLED_EMAIL"));
        };

        let url = self.request_url(window, key, email);
        let body = fetch_text(&self.client, &url, &self.fetch).await?;
        parse_acled_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const BODY: &str = r#"{
        "status": 200,
        "success": true,
        "count": 4,
        "data": [
            {"country": "Sudan", "location": "El Fasher", "latitude": "13.6279", "longitude": "25.3494",
             "event_type": "Battles", "event_date": "2025-03-01"},
            {"country": "Haiti", "location": "Port-au-Prince", "latitude": 18.54, "longitude": -72.34,
             "event_type": "Violence against civilians", "event_date": "2025-03-02"},
            {"country": "Mali", "location": "Gao", "latitude": "n/a", "longitude": "0.04",
             "event_type": "Battles", "event_date": "2025-03-02"},
            {"country": "Niger", "location": "Tillaberi", "latitude": "14.2", "longitude": "1.45",
             "event_type": "Riots", "event_date": "yesterday"}
        ]
    }"#;

    #[test]
    fn test_parse_response() {
        let events = parse_acled_response(BODY).unwrap();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].entity_text, "El Fasher, Sudan");
        assert_eq!(events[0].weight, 1.5);
        assert_eq!(events[0].coordinates(), Some((13.6279, 25.3494)));
        assert_eq!(events[0].occurred_at, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());

        assert_eq!(events[1].weight, 1.0);
        assert_eq!(events[1].coordinates(), Some((18.54, -72.34)));
    }

    #[test]
    fn test_upstream_rejection() {
        let body = r#"{"success": false, "error": {"status": 403, "message": "Access denied"}}"#;
        assert!(matches!(parse_acled_response(body), Err(SourceError::Upstream(_))));
        assert!(matches!(parse_acled_response("<html>"), Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_request_url() {
        let source = AcledSource::new(AcledConfig::default(), FetchConfig::default()).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 8, 12, 0, 0).unwrap();
        let window = TimeWindow::new(end - Duration::days(7), end);
        let url = source.request_url(&window, "k3y", "me@example.org");

        assert!(url.starts_with(ACLED_ENDPOINT));
        assert!(url.contains("event_date=2025-03-01%7C2025-03-08"));
        assert!(url.contains("email=me%40example.org"));
        assert!(url.contains("event_date_where=BETWEEN"));
    }

    #[tokio::test]
    async fn test_unconfigured_returns_nothing() {
        let config = AcledConfig::default().with_credentials(None, None);
        let source = AcledSource::new(config, FetchConfig::default()).unwrap();
        let end = Utc::now();
        let window = TimeWindow::new(end - Duration::days(7), end);

        assert!(matches!(
            source.try_fetch_events(&window).await,
            Err(SourceError::NotConfigured(_))
        ));
        assert!(source.fetch_events(&window).await.is_empty());
    }
}
