//! Common traits for source adapters
//!
//! Adapters implement the fallible `try_*` methods; the pipeline only ever
//! calls the provided wrappers, which log the failure and degrade to an
//! empty result.

use async_trait::async_trait;
use flashpoint_core::{HintProvider, RawEvent, SeverityHint, TimeWindow};
use flashpoint_net::NetError;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from adapter operations
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] NetError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Upstream rejected request: {0}")]
    Upstream(String),

    #[error("Not configured: {0}")]
    NotConfigured(&'static str),
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Parse(e.to_string())
    }
}

/// Provider of point-in-time events (the primary signal)
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Provider name for logs and status output
    fn name(&self) -> &str;

    /// Fetch events occurring inside `window`
    async fn try_fetch_events(&self, window: &TimeWindow) -> Result<Vec<RawEvent>, SourceError>;

    /// Fetch events, degrading any failure to zero events
    async fn fetch_events(&self, window: &TimeWindow) -> Vec<RawEvent> {
        match self.try_fetch_events(window).await {
            Ok(events) => {
                debug!("{} returned {} events", self.name(), events.len());
                events
            }
            Err(SourceError::NotConfigured(what)) => {
                debug!("{} skipped, missing {}", self.name(), what);
                Vec::new()
            }
            Err(e) => {
                warn!("{} failed: {}", self.name(), e);
                Vec::new()
            }
        }
    }
}

/// Provider of coarse per-entity severity hints
#[async_trait]
pub trait HintSource: Send + Sync {
    fn provider(&self) -> HintProvider;

    async fn try_fetch_hints(&self) -> Result<Vec<SeverityHint>, SourceError>;

    /// Fetch hints, degrading any failure to no hints
    async fn fetch_hints(&self) -> Vec<SeverityHint> {
        match self.try_fetch_hints().await {
            Ok(hints) => {
                debug!("{} returned {} hints", self.provider().tag(), hints.len());
                hints
            }
            Err(e) => {
                warn!("{} failed: {}", self.provider().tag(), e);
                Vec::new()
            }
        }
    }
}
