//! Middleware stack para el servidor HTTP.
//!
//! - `request_id_layers`: genera o propaga X-Request-Id (UUID v4)
//! - `request_logging`: logging estructurado de requests dentro de un span

mod logging;
mod request_id;

pub use logging::request_logging;
pub use request_id::{REQUEST_ID_HEADER, propagate_request_id, set_request_id};
