//! One-shot provider reachability probe

use serde::Serialize;
use std::time::Instant;
use tokio::time::timeout;

use crate::AggregationService;

/// Outcome of probing one provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub kind: &'static str,
    pub ok: bool,
    /// Events or hints returned
    pub count: usize,
    pub elapsed_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AggregationService {
    /// Call every adapter once, surfacing errors instead of degrading them
    pub async fn probe_sources(&self) -> Vec<SourceStatus> {
        let window = self.windows().span();
        let limit = std::time::Duration::from_secs(self.config().service.adapter_timeout_secs);

        let events = self.event_sources().iter().map(|source| async move {
            let started = Instant::now();
            let outcome = timeout(limit, source.try_fetch_events(&window)).await;
            let (count, error) = match outcome {
                Ok(Ok(events)) => (events.len(), None),
                Ok(Err(e)) => (0, Some(e.to_string())),
                Err(_) => (0, Some(format!("timed out after {}s", limit.as_secs()))),
            };
            SourceStatus {
                name: source.name().to_string(),
                kind: "events",
                ok: error.is_none(),
                count,
                elapsed_ms: started.elapsed().as_millis(),
                error,
            }
        });

        let hints = self.hint_sources().iter().map(|source| async move {
            let started = Instant::now();
            let outcome = timeout(limit, source.try_fetch_hints()).await;
            let (count, error) = match outcome {
                Ok(Ok(hints)) => (hints.len(), None),
                Ok(Err(e)) => (0, Some(e.to_string())),
                Err(_) => (0, Some(format!("timed out after {}s", limit.as_secs()))),
            };
            SourceStatus {
                name: source.provider().tag().to_string(),
                kind: "hints",
                ok: error.is_none(),
                count,
                elapsed_ms: started.elapsed().as_millis(),
                error,
            }
        });

        let (mut statuses, hint_statuses) =
            futures::join!(futures::future::join_all(events), futures::future::join_all(hints));
        statuses.extend(hint_statuses);
        statuses
    }
}
