use axum::{
    Json,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{StatusCode, request::Parts},
};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::cache::{CacheEntry, make_cache_key};
use crate::error::AppError;
use crate::metrics::{
    CACHE_HITS, CACHE_MISSES, RATE_LIMITED_TOTAL, REQUEST_LATENCY, REQUEST_TOTAL,
    TRACKED_IDENTITIES,
};
use crate::models::{GenerateRequest, GenerateResponse};
use crate::state::AppState;

// Caller identity used as the rate-limit key: first x-forwarded-for entry,
// else the peer address, else "unknown"
pub struct CallerIdentity(pub String);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let identity = forwarded.unwrap_or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string())
        });

        Ok(CallerIdentity(identity))
    }
}

// post handler
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    CallerIdentity(identity): CallerIdentity,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    REQUEST_TOTAL.inc();

    if !state.attempts.try_acquire(&identity) {
        RATE_LIMITED_TOTAL.inc();
        tracing::info!(%identity, "attempt limit reached");
        return Err(AppError::RateLimited);
    }
    TRACKED_IDENTITIES.set(state.attempts.len() as f64);

    let start_time = Instant::now();
    let cache_key = make_cache_key(&payload);

    // check cache first
    if let Some(entry) = state.cache.get(&cache_key) {
        if entry.fresh(state.ttl) {
            if let Ok(response) = serde_json::from_str::<GenerateResponse>(&entry.response) {
                CACHE_HITS.inc();
                tracing::debug!(%identity, "cache hit");
                REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
                return Ok(Json(response));
            }
        }
    }
    CACHE_MISSES.inc();

    let response = state.upstream.generate(&payload).await?;

    if let Ok(json) = serde_json::to_string(&response) {
        state.cache.insert(
            cache_key,
            CacheEntry {
                response: json,
                created_at: Instant::now(),
            },
        );
    }

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    Ok(Json(response))
}

// Preflight response body is empty; the CORS layer adds the headers
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn identity_for(request: Request<()>) -> String {
        let (mut parts, _) = request.into_parts();
        let CallerIdentity(identity) = CallerIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        identity
    }

    #[tokio::test]
    async fn forwarded_header_takes_first_entry() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(())
            .unwrap();

        assert_eq!(identity_for(request).await, "203.0.113.9");
    }

    #[tokio::test]
    async fn falls_back_to_peer_address() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 7], 40123))));

        assert_eq!(identity_for(request).await, "192.0.2.7");
    }

    #[tokio::test]
    async fn unknown_when_nothing_identifies_the_caller() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(identity_for(request).await, "unknown");
    }

    #[tokio::test]
    async fn empty_forwarded_header_is_ignored() {
        let mut request = Request::builder()
            .header("x-forwarded-for", "  ")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 7], 40123))));

        assert_eq!(identity_for(request).await, "192.0.2.7");
    }
}
