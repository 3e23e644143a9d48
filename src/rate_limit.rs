use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::metrics::TRACKED_IDENTITIES;

// Attempt record - tracks requests per caller identity
pub struct AttemptEntry {
    pub count: u32,
    pub last_attempt: Instant,
}

// Store interface for attempt bookkeeping. Kept behind a trait so the
// in-memory map can be swapped for an external cache and constructed
// directly in tests.
pub trait AttemptStore: Send + Sync {
    // Check-and-increment for one identity. Returns false when the
    // identity has exhausted its attempts for the current window.
    fn try_acquire(&self, identity: &str) -> bool;

    // Drop entries whose window has fully elapsed.
    fn evict_stale(&self);

    fn len(&self) -> usize;
}

pub struct MemoryAttemptStore {
    attempts: DashMap<String, AttemptEntry>,
    limit: u32,
    window: Duration,
}

impl MemoryAttemptStore {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            attempts: DashMap::new(),
            limit,
            window,
        }
    }
}

impl AttemptStore for MemoryAttemptStore {
    fn try_acquire(&self, identity: &str) -> bool {
        let now = Instant::now();

        let mut entry = self
            .attempts
            .entry(identity.to_string())
            .or_insert(AttemptEntry {
                count: 0,
                last_attempt: now,
            });

        // window expired? reset the count before evaluating
        if now.duration_since(entry.last_attempt) > self.window {
            entry.count = 0;
        }

        // over limit? deny without touching the timestamp, so the window
        // still dates from the last allowed attempt
        if entry.count >= self.limit {
            return false;
        }

        entry.count += 1;
        entry.last_attempt = now;
        true
    }

    fn evict_stale(&self) {
        self.attempts
            .retain(|_, entry| entry.last_attempt.elapsed() <= self.window);
    }

    fn len(&self) -> usize {
        self.attempts.len()
    }
}

// Periodic sweep of stale identities, spawned at startup
pub async fn evict_loop(store: Arc<dyn AttemptStore>, period: Duration) {
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;
        store.evict_stale();
        TRACKED_IDENTITIES.set(store.len() as f64);
        tracing::debug!(identities = store.len(), "attempt store swept");
    }
}
