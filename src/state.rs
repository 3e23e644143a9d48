use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheEntry;
use crate::rate_limit::AttemptStore;
use crate::upstream::GeminiClient;

// app's shared state
pub struct AppState {
    pub upstream: GeminiClient,
    pub cache: DashMap<String, CacheEntry>,
    pub ttl: Duration, // how long cached responses stay valid
    pub attempts: Arc<dyn AttemptStore>,
}
