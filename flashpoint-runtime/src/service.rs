//! Aggregation service
//!
//! Owns the only mutable state of the engine: the decay tracker and the
//! result cache. One cycle runs:
//! - every event adapter once over the span of both windows, plus every hint adapter, concurrently
//! - aggregation of the prior and current windows
//! - scoring, then decay, reinforcement and classification
//! - upgrade-only merge of hints in precedence order
//! - publication to the cache

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use flashpoint_core::{
    aggregate, merge, sort_records, Assessment, Clock, CountryResolver, DecayTracker, HintBatch, RawEvent,
    RollingWindows, ScoringEngine, ThreatRecord, TimeWindow, SEED_ENTITY_IDS,
};
use flashpoint_sources::{EventSource, HintSource};

use crate::{fallback_records, CachedResult, FlashpointConfig, ResultCache};

/// Outbound contract of a query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatSnapshot {
    /// Sorted by level descending, then score descending
    pub threats: Vec<ThreatRecord>,
    /// Country code of every emitted record that has one
    pub affected_entity_codes: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl ThreatSnapshot {
    pub fn from_result(result: &CachedResult) -> Self {
        let mut codes: Vec<String> = Vec::new();
        for record in &result.records {
            if let Some(code) = &record.country_code {
                if !codes.contains(code) {
                    codes.push(code.clone());
                }
            }
        }

        Self {
            threats: result.records.clone(),
            affected_entity_codes: codes,
            updated_at: result.computed_at,
        }
    }
}

/// Single-instance owner of the pipeline, decay state and cache
pub struct AggregationService {
    config: FlashpointConfig,
    engine: ScoringEngine,
    resolver: CountryResolver,
    events: Vec<Arc<dyn EventSource>>,
    hints: Vec<Arc<dyn HintSource>>,
    tracker: Mutex<DecayTracker>,
    cache: ResultCache,
    clock: Arc<dyn Clock>,
    adapter_timeout: std::time::Duration,
}

impl AggregationService {
    /// Create a service seeded with the default seed entities
    pub fn new(
        config: FlashpointConfig,
        events: Vec<Arc<dyn EventSource>>,
        hints: Vec<Arc<dyn HintSource>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tracker = DecayTracker::seeded(SEED_ENTITY_IDS, config.decay.clone(), clock.now());
        let adapter_timeout = std::time::Duration::from_secs(config.service.adapter_timeout_secs);

        info!(
            "Aggregation service ready: {} event sources, {} hint sources, {} seeds",
            events.len(),
            hints.len(),
            tracker.len()
        );

        Self {
            engine: ScoringEngine::new(config.scoring.clone(), config.levels.clone()),
            resolver: CountryResolver::conflict_zones(),
            events,
            hints,
            tracker: Mutex::new(tracker),
            cache: ResultCache::new(),
            clock,
            adapter_timeout,
            config,
        }
    }

    /// Replace the seed list
    pub fn with_seeds(self, ids: &[&str]) -> Self {
        let tracker = DecayTracker::seeded(ids, self.config.decay.clone(), self.clock.now());
        *self.tracker.lock() = tracker;
        self
    }

    pub fn with_adapter_timeout(mut self, adapter_timeout: std::time::Duration) -> Self {
        self.adapter_timeout = adapter_timeout;
        self
    }

    pub fn config(&self) -> &FlashpointConfig {
        &self.config
    }

    pub fn event_sources(&self) -> &[Arc<dyn EventSource>] {
        &self.events
    }

    pub fn hint_sources(&self) -> &[Arc<dyn HintSource>] {
        &self.hints
    }

    /// Current windows ending now
    pub fn windows(&self) -> RollingWindows {
        RollingWindows::ending_at(self.clock.now(), Duration::days(self.config.service.window_days))
    }

    /// Serve the cached result, recomputing on expiry
    pub async fn query(&self) -> ThreatSnapshot {
        ThreatSnapshot::from_result(&*self.result(false).await)
    }

    /// Recompute regardless of freshness, joining any computation already running
    pub async fn refresh(&self) -> ThreatSnapshot {
        ThreatSnapshot::from_result(&*self.result(true).await)
    }

    /// Cached result with its metadata
    pub async fn result(&self, force: bool) -> Arc<CachedResult> {
        self.cache
            .get_or_compute(self.clock.as_ref(), force, || self.compute())
            .await
    }

    async fn compute(&self) -> CachedResult {
        let cycle = Uuid::new_v4();
        let now = self.clock.now();
        let windows = RollingWindows::ending_at(now, Duration::days(self.config.service.window_days));
        let ttl = Duration::seconds(self.config.service.cache_ttl_secs as i64);

        debug!("Cycle {} starting at {}", cycle, now);

        // one fetch per adapter; the aggregator splits events by window
        let span = windows.span();
        let event_calls = self.events.iter().map(|source| self.fetch_events(source.as_ref(), span));
        let hint_calls = self.hints.iter().map(|source| self.fetch_hints(source.as_ref()));
        let (event_results, hint_batches) = futures::join!(join_all(event_calls), join_all(hint_calls));
        let raw: Vec<RawEvent> = event_results.into_iter().flatten().collect();

        let current = aggregate(&self.resolver, &raw, &windows.current);
        let prior = aggregate(&self.resolver, &raw, &windows.prior);

        if current.is_empty() && prior.is_empty() {
            self.tracker.lock().decay(now);
            let records = fallback_records();
            warn!(
                "Cycle {}: no usable events from any source ({} raw), serving {} fallback records",
                cycle,
                raw.len(),
                records.len()
            );
            return CachedResult::new(records, now, ttl, true);
        }

        let primary = {
            let mut tracker = self.tracker.lock();
            Assessment::new(&self.engine, &self.config.states, self.config.service.window_days).run(
                &current,
                &prior,
                &mut tracker,
                now,
            )
        };

        let merged = merge(primary, &hint_batches, &self.resolver);
        let mut records: Vec<ThreatRecord> = merged.into_values().collect();
        sort_records(&mut records);

        info!(
            "Cycle {}: {} records from {} raw events ({} / {} entities current / prior), fallback=false",
            cycle,
            records.len(),
            raw.len(),
            current.len(),
            prior.len()
        );
        CachedResult::new(records, now, ttl, false)
    }

    async fn fetch_events(&self, source: &dyn EventSource, window: TimeWindow) -> Vec<RawEvent> {
        match timeout(self.adapter_timeout, source.fetch_events(&window)).await {
            Ok(events) => events,
            Err(_) => {
                warn!("{} timed out after {:?}", source.name(), self.adapter_timeout);
                Vec::new()
            }
        }
    }

    async fn fetch_hints(&self, source: &dyn HintSource) -> HintBatch {
        let provider = source.provider();
        match timeout(self.adapter_timeout, source.fetch_hints()).await {
            Ok(hints) => HintBatch::new(provider, hints),
            Err(_) => {
                warn!("{} timed out after {:?}", provider.tag(), self.adapter_timeout);
                HintBatch::empty(provider)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use flashpoint_core::{
        ConflictState, Direction, HintProvider, ManualClock, SeverityHint, ThreatLevel,
    };
    use flashpoint_sources::SourceError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    /// Returns the same events for every window
    struct StaticEvents {
        events: Vec<RawEvent>,
        calls: AtomicUsize,
        delay_ms: u64,
    }

    impl StaticEvents {
        fn new(events: Vec<RawEvent>) -> Self {
            Self {
                events,
                calls: AtomicUsize::new(0),
                delay_ms: 0,
            }
        }

        fn delayed(mut self, ms: u64) -> Self {
            self.delay_ms = ms;
            self
        }
    }

    #[async_trait]
    impl EventSource for StaticEvents {
        fn name(&self) -> &str {
            "static"
        }

        async fn try_fetch_events(&self, _window: &TimeWindow) -> Result<Vec<RawEvent>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
            Ok(self.events.clone())
        }
    }

    struct FailingEvents;

    #[async_trait]
    impl EventSource for FailingEvents {
        fn name(&self) -> &str {
            "failing"
        }

        async fn try_fetch_events(&self, _window: &TimeWindow) -> Result<Vec<RawEvent>, SourceError> {
            Err(SourceError::Upstream("503 from upstream".to_string()))
        }
    }

    struct StaticHints {
        provider: HintProvider,
        hints: Vec<SeverityHint>,
    }

    #[async_trait]
    impl HintSource for StaticHints {
        fn provider(&self) -> HintProvider {
            self.provider
        }

        async fn try_fetch_hints(&self) -> Result<Vec<SeverityHint>, SourceError> {
            Ok(self.hints.clone())
        }
    }

    fn events(text: &str, count: usize, at: DateTime<Utc>) -> Vec<RawEvent> {
        (0..count).map(|_| RawEvent::new(text, at)).collect()
    }

    fn doubling_events() -> Vec<RawEvent> {
        let mut raw = events("Aleppo, Syria", 20, t0() - Duration::days(2));
        raw.extend(events("Idlib, Syria", 10, t0() - Duration::days(10)));
        raw
    }

    fn service(
        clock: &Arc<ManualClock>,
        events: Vec<Arc<dyn EventSource>>,
        hints: Vec<Arc<dyn HintSource>>,
    ) -> AggregationService {
        AggregationService::new(FlashpointConfig::default(), events, hints, clock.clone()).with_seeds(&[])
    }

    #[tokio::test]
    async fn test_doubling_scenario() {
        let clock = Arc::new(ManualClock::new(t0()));
        let svc = service(&clock, vec![Arc::new(StaticEvents::new(doubling_events()))], vec![]);

        let snapshot = svc.query().await;
        assert_eq!(snapshot.threats.len(), 1);

        let syria = &snapshot.threats[0];
        assert_eq!(syria.id, "syria");
        assert_eq!(syria.score, 52.0);
        assert_eq!(syria.level, ThreatLevel::High);
        assert_eq!(syria.direction, Direction::Rising);
        assert_eq!(syria.acceleration_pct, 100.0);
        assert_eq!(syria.recent_event_count, 20.0);
        assert_eq!(syria.last_event_at, Some(t0() - Duration::days(2)));
        assert_eq!(snapshot.affected_entity_codes, vec!["760".to_string()]);
        assert_eq!(snapshot.updated_at, t0());
    }

    #[tokio::test]
    async fn test_total_failure_serves_fallback() {
        let clock = Arc::new(ManualClock::new(t0()));
        let svc = service(
            &clock,
            vec![Arc::new(FailingEvents), Arc::new(StaticEvents::new(Vec::new()))],
            vec![Arc::new(StaticHints {
                provider: HintProvider::ReliefWeb,
                hints: vec![SeverityHint::new("Chile", ThreatLevel::High)],
            })],
        );

        let result = svc.result(false).await;
        assert!(result.from_fallback);
        assert_eq!(result.records, fallback_records());

        let snapshot = svc.query().await;
        assert_eq!(snapshot.threats, fallback_records());
        assert_eq!(snapshot.updated_at, t0());
    }

    #[tokio::test]
    async fn test_unusable_events_serve_fallback() {
        let clock = Arc::new(ManualClock::new(t0()));
        let mut raw = events("Quiet day in Reykjavik", 3, t0() - Duration::days(1));
        // resolvable, but older than both windows
        raw.extend(events("Aleppo, Syria", 5, t0() - Duration::days(20)));
        let svc = service(&clock, vec![Arc::new(StaticEvents::new(raw))], vec![]);

        let result = svc.result(false).await;
        assert!(result.from_fallback);
        assert_eq!(result.records, fallback_records());
    }

    #[tokio::test]
    async fn test_seed_persists_then_drops() {
        let clock = Arc::new(ManualClock::new(t0()));
        // one weak event keeps the pipeline off the fallback path
        let quiet = StaticEvents::new(events("Santiago, Chile", 1, t0() - Duration::days(1)));
        let svc = AggregationService::new(
            FlashpointConfig::default(),
            vec![Arc::new(quiet)],
            vec![],
            clock.clone(),
        )
        .with_seeds(&["sudan"]);

        let first = svc.query().await;
        assert_eq!(first.threats.len(), 1);
        assert_eq!(first.threats[0].id, "sudan");
        assert_eq!(first.threats[0].score, 25.0);

        clock.advance(Duration::days(30));
        let day30 = svc.refresh().await;
        assert_eq!(day30.threats.len(), 1);
        assert!(day30.threats[0].score > 10.0);
        assert_eq!(day30.threats[0].conflict_state, ConflictState::Active);

        clock.advance(Duration::days(1));
        let day31 = svc.refresh().await;
        assert!(day31.threats.is_empty());
    }

    #[tokio::test]
    async fn test_hints_merge_in_precedence_order() {
        let clock = Arc::new(ManualClock::new(t0()));
        let svc = service(
            &clock,
            vec![Arc::new(StaticEvents::new(doubling_events()))],
            vec![
                Arc::new(StaticHints {
                    provider: HintProvider::ReliefWeb,
                    hints: vec![
                        SeverityHint::new("Syria", ThreatLevel::Critical),
                        SeverityHint::new("Haiti", ThreatLevel::Elevated),
                    ],
                }),
                Arc::new(StaticHints {
                    provider: HintProvider::CrisisWatch,
                    hints: vec![SeverityHint::new("Syria", ThreatLevel::Low)],
                }),
            ],
        );

        let snapshot = svc.query().await;
        assert_eq!(snapshot.threats.len(), 2);

        let syria = &snapshot.threats[0];
        assert_eq!(syria.level, ThreatLevel::Critical);
        assert_eq!(syria.score, 52.0);
        assert!(syria.description.ends_with(" · crisis-watch · reliefweb"));

        let haiti = &snapshot.threats[1];
        assert_eq!(haiti.conflict_state, ConflictState::Escalating);
        assert_eq!(haiti.score, 0.0);
        assert_eq!(snapshot.affected_entity_codes, vec!["760".to_string(), "332".to_string()]);
    }

    #[tokio::test]
    async fn test_deterministic_across_services() {
        let clock = Arc::new(ManualClock::new(t0()));
        let mut raw = doubling_events();
        raw.extend(events("Gaza City", 7, t0() - Duration::days(1)));
        raw.extend(events("Port-au-Prince, Haiti", 9, t0() - Duration::days(3)));

        let build = || {
            AggregationService::new(
                FlashpointConfig::default(),
                vec![Arc::new(StaticEvents::new(raw.clone()))],
                vec![Arc::new(StaticHints {
                    provider: HintProvider::CrisisWatch,
                    hints: vec![SeverityHint::new("Cameroon", ThreatLevel::Elevated)],
                })],
                clock.clone(),
            )
        };

        let a = build().query().await;
        let b = build().query().await;
        assert_eq!(a, b);
        assert!(a.threats.windows(2).all(|w| w[0].level >= w[1].level));
    }

    #[tokio::test]
    async fn test_concurrent_queries_fan_out_once() {
        let clock = Arc::new(ManualClock::new(t0()));
        let source = Arc::new(StaticEvents::new(doubling_events()).delayed(30));
        let svc = service(&clock, vec![source.clone()], vec![]);

        let callers = (0..8).map(|i| {
            let svc = &svc;
            async move {
                if i == 3 {
                    svc.refresh().await
                } else {
                    svc.query().await
                }
            }
        });
        let snapshots = join_all(callers).await;

        // one cycle, one fetch spanning both windows
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(snapshots.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_cache_expiry() {
        let clock = Arc::new(ManualClock::new(t0()));
        let source = Arc::new(StaticEvents::new(doubling_events()));
        let svc = service(&clock, vec![source.clone()], vec![]);

        svc.query().await;
        clock.advance(Duration::minutes(29));
        svc.query().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::minutes(2));
        svc.query().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slow_adapter_times_out() {
        let clock = Arc::new(ManualClock::new(t0()));
        let slow = Arc::new(StaticEvents::new(events("Syria", 50, t0() - Duration::days(1))).delayed(5_000));
        let svc = service(
            &clock,
            vec![slow, Arc::new(StaticEvents::new(doubling_events()))],
            vec![],
        )
        .with_adapter_timeout(std::time::Duration::from_millis(50));

        let snapshot = svc.query().await;
        assert_eq!(snapshot.threats[0].score, 52.0);
    }
}
