// モジュール定義
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shared;
pub mod state;

pub use state::AppState;

use tracing::info;

/// Initializes the global tracing subscriber. Call once from the binary
/// entry point; tests install their own subscribers.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shukatsu=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Builds the application state from the environment configuration.
pub fn bootstrap() -> anyhow::Result<AppState> {
    let config = shared::config::AppConfig::load(None)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;
    info!(
        base_url = %config.api.base_url,
        debounce_ms = config.sync.debounce_ms,
        "shukatsu core starting"
    );
    AppState::new(config)
}
