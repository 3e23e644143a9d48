use clap::Parser;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use gemini_gateway::build_router;
use gemini_gateway::config::Args;
use gemini_gateway::rate_limit::{self, AttemptStore, MemoryAttemptStore};
use gemini_gateway::state::AppState;
use gemini_gateway::upstream::GeminiClient;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // the only secret: never taken from the CLI
    let api_key = match std::env::var("GOOGLE_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => {
            tracing::error!("GOOGLE_API_KEY is not set");
            std::process::exit(1);
        }
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .expect("failed to create HTTP client");

    let attempts: Arc<dyn AttemptStore> = Arc::new(MemoryAttemptStore::new(
        args.rate_limit,
        Duration::from_secs(args.rate_window),
    ));

    let state = Arc::new(AppState {
        upstream: GeminiClient::new(
            client,
            args.upstream_url.clone(),
            args.model.clone(),
            api_key,
        ),
        cache: DashMap::new(),
        ttl: Duration::from_secs(args.cache_ttl),
        attempts: attempts.clone(),
    });

    tokio::spawn(rate_limit::evict_loop(
        attempts,
        Duration::from_secs(args.evict_interval),
    ));

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    tracing::info!(
        port = args.port,
        upstream = %args.upstream_url,
        model = %args.model,
        "gateway running"
    );
    tracing::info!(
        limit = args.rate_limit,
        window_secs = args.rate_window,
        cache_ttl_secs = args.cache_ttl,
        "rate limit configured"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
