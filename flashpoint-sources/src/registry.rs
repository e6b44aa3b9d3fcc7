//! Default adapter set
//!
//! Builds the production event and hint adapters from one settings struct.
//! Hint sources are returned in merge precedence order.

use std::sync::Arc;

use flashpoint_core::Clock;
use flashpoint_net::FetchConfig;

use crate::{
    AcledConfig, AcledSource, CrisisWatchSource, EventSource, HeadlineSource, HintSource, ReliefWebConfig,
    ReliefWebSource, SourceError,
};

/// Settings shared by the default adapters
#[derive(Debug, Clone, Default)]
pub struct SourceSettings {
    pub fetch: FetchConfig,
    pub acled: AcledConfig,
    pub reliefweb: ReliefWebConfig,
    /// Extra headline feeds replacing the defaults when non-empty
    pub headline_feeds: Vec<String>,
}

impl SourceSettings {
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.fetch = self.fetch.with_timeout(secs);
        self
    }
}

/// Event adapters: ACLED, then conflict headlines
pub fn default_event_sources(settings: &SourceSettings) -> Result<Vec<Arc<dyn EventSource>>, SourceError> {
    let headlines = if settings.headline_feeds.is_empty() {
        HeadlineSource::new(settings.fetch.clone())?
    } else {
        HeadlineSource::with_feeds(settings.headline_feeds.clone(), settings.fetch.clone())?
    };

    let sources: Vec<Arc<dyn EventSource>> = vec![
        Arc::new(AcledSource::new(settings.acled.clone(), settings.fetch.clone())?),
        Arc::new(headlines),
    ];
    Ok(sources)
}

/// Hint adapters in precedence order
pub fn default_hint_sources(
    settings: &SourceSettings,
    clock: Arc<dyn Clock>,
) -> Result<Vec<Arc<dyn HintSource>>, SourceError> {
    let sources: Vec<Arc<dyn HintSource>> = vec![
        Arc::new(CrisisWatchSource::new(settings.fetch.clone())?.with_clock(clock.clone())),
        Arc::new(ReliefWebSource::new(settings.reliefweb.clone(), settings.fetch.clone())?.with_clock(clock)),
    ];
    Ok(sources)
}
