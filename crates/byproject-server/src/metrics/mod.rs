//! Metrics for the HTTP service.
//!
//! Cache metrics are recorded by `byproject-cache` itself; this module
//! adds request metrics and the Prometheus recorder.

pub mod http;
pub mod setup;

pub use setup::init_metrics;
