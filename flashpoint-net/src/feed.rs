//! RSS 2.0 / Atom feed fetching and item extraction

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{fetch_text, strip_html, FetchConfig, NetError};

/// One item from a feed, with markup already stripped
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedItem {
    pub title: String,
    pub link: Option<String>,
    pub summary: String,
    /// `None` when the feed omits or garbles the date
    pub published: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Title,
    Link,
    Summary,
    Date,
}

fn field_for(local: &[u8]) -> Option<Field> {
    match local {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"description" | b"summary" | b"content" | b"encoded" => Some(Field::Summary),
        b"pubDate" | b"published" | b"updated" | b"date" => Some(Field::Date),
        _ => None,
    }
}

fn is_item(local: &[u8]) -> bool {
    matches!(local, b"item" | b"entry")
}

/// Parse an RSS 2.0 or Atom document into items
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, NetError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let local = e.local_name();
                if is_item(local.as_ref()) {
                    current = Some(FeedItem::default());
                } else if let Some(item) = current.as_mut() {
                    if local.as_ref() == b"link" && item.link.is_none() {
                        item.link = href(e);
                    }
                    if field.is_none() {
                        field = field_for(local.as_ref());
                        text.clear();
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                // Atom: <link href="..."/>
                if let Some(item) = current.as_mut() {
                    if e.local_name().as_ref() == b"link" && item.link.is_none() {
                        item.link = href(e);
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if field.is_some() {
                    match e.unescape() {
                        Ok(s) => text.push_str(&s),
                        Err(_) => text.push_str(&String::from_utf8_lossy(e)),
                    }
                }
            }
            Ok(Event::CData(ref e)) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(ref e)) => {
                let local = e.local_name();
                if is_item(local.as_ref()) {
                    if let Some(item) = current.take() {
                        if !item.title.is_empty() {
                            items.push(item);
                        }
                    }
                } else if let (Some(f), Some(item)) = (field, current.as_mut()) {
                    if field_for(local.as_ref()) == Some(f) {
                        assign(item, f, &text);
                        field = None;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(NetError::Xml(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(items)
}

fn href(e: &BytesStart) -> Option<String> {
    e.try_get_attribute("href")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

fn assign(item: &mut FeedItem, field: Field, raw: &str) {
    match field {
        Field::Title => item.title = strip_html(raw),
        Field::Link => {
            let link = raw.trim();
            if !link.is_empty() {
                item.link = Some(link.to_string());
            }
        }
        // first summary-like element wins; content:encoded usually repeats it
        Field::Summary if item.summary.is_empty() => item.summary = strip_html(raw),
        Field::Summary => {}
        Field::Date if item.published.is_none() => item.published = parse_date(raw),
        Field::Date => {}
    }
}

/// Parse RFC 2822 (RSS) or RFC 3339 (Atom) timestamps
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Fetch and parse one feed
pub async fn fetch_feed(client: &Client, url: &str, config: &FetchConfig) -> Result<Vec<FeedItem>, NetError> {
    debug!("Fetching feed: {}", url);
    let body = fetch_text(client, url, config).await?;
    let items = parse_feed(&body)?;
    debug!("Feed {} returned {} items", url, items.len());
    Ok(items)
}

/// Fetch several feeds concurrently.
///
/// A failed feed contributes no items. Fails only when every feed failed,
/// returning the last error seen.
pub async fn fetch_feeds(
    client: &Client,
    urls: &[&str],
    config: &FetchConfig,
    max_concurrent: usize,
) -> Result<Vec<FeedItem>, NetError> {
    use futures::stream::{self, StreamExt};

    let owned_urls: Vec<String> = urls.iter().map(ToString::to_string).collect();
    let results: Vec<Result<Vec<FeedItem>, NetError>> = stream::iter(owned_urls)
        .map(|url: String| {
            let client = client.clone();
            let config = config.clone();
            async move {
                let result = fetch_feed(&client, &url, &config).await;
                if let Err(e) = &result {
                    warn!("Feed {} failed: {}", url, e);
                }
                result
            }
        })
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    let mut items = Vec::new();
    let mut last_error = None;
    let mut any_ok = results.is_empty();
    for result in results {
        match result {
            Ok(batch) => {
                any_ok = true;
                items.extend(batch);
            }
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) if !any_ok => Err(e),
        _ => Ok(items),
    }
}
