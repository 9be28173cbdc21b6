//! ByProject cache server binary.

use anyhow::Context;
use byproject_cache::CleanupScheduler;
use byproject_server::metrics::init_metrics;
use byproject_server::{AppConfig, AppState, run_server};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let addr = config.socket_addr()?;

    tracing::info!(
        "Starting ByProject cache server v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Base currency: {}", config.cache.base_currency);

    let prometheus = init_metrics().context("failed to install metrics recorder")?;
    let state = AppState::from_config(&config).context("failed to build caches")?;

    let mut scheduler = CleanupScheduler::new(config.cleanup_interval());
    for target in state.cleanup_targets() {
        scheduler = scheduler.with_target(target);
    }
    let _cleanup = scheduler.start();

    run_server(addr, state, prometheus).await?;

    Ok(())
}
