//! Window aggregator - raw events to per-entity signals
//!
//! Each cycle aggregates two contiguous, equal-length windows:
//! prior `[now - 2W, now - W)` and current `[now - W, now)`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{CanonicalEntity, CountryResolver, CountrySignal, RawEvent};

/// Half-open time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    /// Latest instant still inside the window
    pub fn last_instant(&self) -> DateTime<Utc> {
        self.end - Duration::nanoseconds(1)
    }
}

/// Prior and current windows ending at `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindows {
    pub prior: TimeWindow,
    pub current: TimeWindow,
}

impl RollingWindows {
    pub fn ending_at(now: DateTime<Utc>, length: Duration) -> Self {
        let split = now - length;
        Self {
            prior: TimeWindow::new(split - length, split),
            current: TimeWindow::new(split, now),
        }
    }

    /// Both windows as one interval, for adapters fetched once per cycle
    pub fn span(&self) -> TimeWindow {
        TimeWindow::new(self.prior.start, self.current.end)
    }
}

struct Accumulator {
    entity: &'static CanonicalEntity,
    count: f64,
    best_weight: f64,
    best_lat: f64,
    best_lon: f64,
    last_event_at: DateTime<Utc>,
}

impl Accumulator {
    fn start(entity: &'static CanonicalEntity, event: &RawEvent) -> Self {
        let (lat, lon) = event.coordinates().unwrap_or((entity.lat, entity.lon));
        Self {
            entity,
            count: event.weight,
            best_weight: event.weight,
            best_lat: lat,
            best_lon: lon,
            last_event_at: event.occurred_at,
        }
    }

    fn add(&mut self, event: &RawEvent) {
        self.count += event.weight;
        if event.weight > self.best_weight {
            let (lat, lon) = event.coordinates().unwrap_or((self.entity.lat, self.entity.lon));
            self.best_weight = event.weight;
            self.best_lat = lat;
            self.best_lon = lon;
        }
        if event.occurred_at > self.last_event_at {
            self.last_event_at = event.occurred_at;
        }
    }

    fn finish(self) -> CountrySignal {
        CountrySignal {
            entity: self.entity,
            window_event_count: self.count,
            best_lat: self.best_lat,
            best_lon: self.best_lon,
            last_event_at: self.last_event_at,
        }
    }
}

/// Aggregate events falling inside `window` into one signal per entity.
///
/// Events whose text resolves to no entity, that fall outside the window,
/// or that carry no positive weight are dropped. The map is keyed by entity
/// id so iteration order is stable.
pub fn aggregate(
    resolver: &CountryResolver,
    events: &[RawEvent],
    window: &TimeWindow,
) -> BTreeMap<&'static str, CountrySignal> {
    let mut acc: BTreeMap<&'static str, Accumulator> = BTreeMap::new();

    for event in events {
        if !window.contains(event.occurred_at) || event.weight <= 0.0 {
            continue;
        }
        let Some(entity) = resolver.resolve(&event.entity_text) else {
            continue;
        };

        match acc.get_mut(entity.id) {
            Some(entry) => entry.add(event),
            None => {
                acc.insert(entity.id, Accumulator::start(entity, event));
            }
        }
    }

    acc.into_iter().map(|(id, a)| (id, a.finish())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_rolling_windows_are_contiguous() {
        let windows = RollingWindows::ending_at(t0(), Duration::days(7));
        assert_eq!(windows.prior.end, windows.current.start);
        assert_eq!(windows.prior.length(), windows.current.length());
        assert_eq!(windows.current.end, t0());
        assert!(!windows.current.contains(t0()));
        assert!(windows.prior.contains(t0() - Duration::days(14)));
    }

    #[test]
    fn test_span_covers_both_windows() {
        let windows = RollingWindows::ending_at(t0(), Duration::days(7));
        let span = windows.span();
        assert_eq!(span.start, windows.prior.start);
        assert_eq!(span.end, t0());
        assert_eq!(span.length(), Duration::days(14));
        assert!(span.contains(span.last_instant()));
        assert!(windows.current.contains(span.last_instant()));
    }

    #[test]
    fn test_sums_weights_per_entity() {
        let resolver = CountryResolver::conflict_zones();
        let window = TimeWindow::new(t0() - Duration::days(7), t0());
        let at = t0() - Duration::days(1);
        let events = vec![
            RawEvent::new("Shelling in Kharkiv, Ukraine", at),
            RawEvent::new("Ukraine drone strike", at).with_weight(1.5),
            RawEvent::new("Khartoum, Sudan", at),
            RawEvent::new("Somewhere unknown", at),
        ];

        let signals = aggregate(&resolver, &events, &window);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals["ukraine"].window_event_count, 2.5);
        assert_eq!(signals["sudan"].window_event_count, 1.0);
    }

    #[test]
    fn test_discards_events_outside_window() {
        let resolver = CountryResolver::conflict_zones();
        let window = TimeWindow::new(t0() - Duration::days(7), t0());
        let events = vec![
            RawEvent::new("Haiti", t0() - Duration::days(8)),
            RawEvent::new("Haiti", t0()),
            RawEvent::new("Haiti", t0() - Duration::hours(1)),
        ];

        let signals = aggregate(&resolver, &events, &window);
        assert_eq!(signals["haiti"].window_event_count, 1.0);
    }

    #[test]
    fn test_tracks_heaviest_event_coordinates_and_latest_time() {
        let resolver = CountryResolver::conflict_zones();
        let window = TimeWindow::new(t0() - Duration::days(7), t0());
        let early = t0() - Duration::days(5);
        let late = t0() - Duration::days(1);
        let events = vec![
            RawEvent::new("Sudan", late).with_coordinates(13.0, 25.0),
            RawEvent::new("Sudan", early).with_weight(3.0).with_coordinates(15.6, 32.5),
            RawEvent::new("Sudan", early).with_weight(3.0).with_coordinates(11.0, 29.0),
        ];

        let signal = &aggregate(&resolver, &events, &window)["sudan"];
        assert_eq!((signal.best_lat, signal.best_lon), (15.6, 32.5));
        assert_eq!(signal.last_event_at, late);
        assert_eq!(signal.window_event_count, 7.0);
    }

    #[test]
    fn test_falls_back_to_reference_coordinates() {
        let resolver = CountryResolver::conflict_zones();
        let window = TimeWindow::new(t0() - Duration::days(7), t0());
        let events = vec![RawEvent::new("Yemen", t0() - Duration::days(2))];

        let signal = &aggregate(&resolver, &events, &window)["yemen"];
        assert_eq!((signal.best_lat, signal.best_lon), (15.5, 48.5));
    }
}
