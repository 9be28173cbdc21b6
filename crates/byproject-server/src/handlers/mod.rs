//! HTTP handlers.

pub mod health;
pub mod invalidate;
pub mod metrics;
pub mod rates;
pub mod stats;
pub mod translate;
