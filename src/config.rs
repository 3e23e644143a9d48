use clap::Parser;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "gemini-gateway")]
#[command(about = "Rate-limited proxy for Gemini image generation")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Upstream API base URL
    #[arg(
        short,
        long,
        default_value = "https://generativelanguage.googleapis.com"
    )]
    pub upstream_url: String,

    // Model used for image generation
    #[arg(short, long, default_value = "gemini-2.5-flash-image-preview")]
    pub model: String,

    // Max attempts per caller per window
    #[arg(long, default_value_t = 5)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 86_400)]
    pub rate_window: u64,

    // Cache TTL in seconds
    #[arg(short, long, default_value_t = 30)]
    pub cache_ttl: u64,

    // Stale identity sweep interval in seconds
    #[arg(long, default_value_t = 3_600)]
    pub evict_interval: u64,
}
