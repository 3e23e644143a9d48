mod generate;
mod health;
mod metrics;

pub use generate::{generate_handler, preflight_handler};
pub use health::health_handler;
pub use metrics::metrics_handler;
