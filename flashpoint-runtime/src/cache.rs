//! Result cache with in-flight computation sharing
//!
//! Readers take the last published snapshot without waiting. A miss takes
//! the compute lock; callers that queued behind a computation reuse its
//! result instead of fanning out upstream again.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use flashpoint_core::{Clock, ThreatRecord};

/// One published pipeline result; replaced whole, never mutated
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResult {
    /// Sorted by level, then score, descending
    pub records: Vec<ThreatRecord>,
    pub computed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// First 16 hex digits of the SHA-256 of the serialized records
    pub fingerprint: String,
    pub from_fallback: bool,
}

impl CachedResult {
    pub fn new(records: Vec<ThreatRecord>, computed_at: DateTime<Utc>, ttl: Duration, from_fallback: bool) -> Self {
        let fingerprint = fingerprint(&records);
        Self {
            records,
            computed_at,
            expires_at: computed_at + ttl,
            fingerprint,
            from_fallback,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Stable short hash of a record list
pub fn fingerprint(records: &[ThreatRecord]) -> String {
    let mut hasher = Sha256::new();
    match serde_json::to_vec(records) {
        Ok(bytes) => hasher.update(&bytes),
        Err(_) => {
            for record in records {
                hasher.update(record.id.as_bytes());
            }
        }
    }
    hasher.finalize()[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Process-wide singleton holding the current result
#[derive(Default)]
pub struct ResultCache {
    snapshot: RwLock<Option<Arc<CachedResult>>>,
    compute_lock: Mutex<()>,
    /// Bumped on every publish
    generation: AtomicU64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last published result, fresh or not
    pub fn snapshot(&self) -> Option<Arc<CachedResult>> {
        self.snapshot.read().clone()
    }

    fn fresh(&self, now: DateTime<Utc>) -> Option<Arc<CachedResult>> {
        self.snapshot().filter(|r| r.is_fresh(now))
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Return a fresh result or compute one.
    ///
    /// With `force` the freshness check is skipped, but a computation that
    /// completed while this caller waited for the lock is still reused.
    pub async fn get_or_compute<F, Fut>(&self, clock: &dyn Clock, force: bool, compute: F) -> Arc<CachedResult>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CachedResult>,
    {
        let seen = self.generation();
        if !force {
            if let Some(hit) = self.fresh(clock.now()) {
                return hit;
            }
        }

        let _guard = self.compute_lock.lock().await;

        if self.generation() != seen {
            if let Some(joined) = self.snapshot() {
                debug!("Joined in-flight computation");
                return joined;
            }
        }
        if !force {
            if let Some(hit) = self.fresh(clock.now()) {
                return hit;
            }
        }

        let result = Arc::new(compute().await);
        *self.snapshot.write() = Some(result.clone());
        self.generation.fetch_add(1, Ordering::AcqRel);
        result
    }
}
