//! ByProject Server - HTTP service for the rate and translation caches
//!
//! Exposes exchange rates, conversions and cached translations over HTTP,
//! plus cache administration, health and Prometheus metrics.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod state;

pub use crate::config::{AppConfig, SettingsError};
pub use error::AppError;
pub use handlers::health::HealthResponse;
pub use server::{create_router, run_server};
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }
}
