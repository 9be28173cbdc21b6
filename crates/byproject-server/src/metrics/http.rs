//! HTTP metrics middleware.

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

const REQUESTS_TOTAL: &str = "byproject_http_requests_total";
const REQUEST_DURATION: &str = "byproject_http_request_duration_seconds";
const REQUESTS_IN_FLIGHT: &str = "byproject_http_requests_in_flight";

/// Etiqueta usada cuando ninguna ruta del router coincide.
const UNMATCHED: &str = "unmatched";

/// Registra contador, histograma y gauge de cada request.
///
/// El label `path` es la ruta del router (`/cache/translations/{source}/{target}`),
/// nunca la URI concreta. `class` agrupa el status (`2xx`, `4xx`, `5xx`).
pub async fn http_metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_owned();
    let path = matched_path.map_or_else(|| UNMATCHED.to_owned(), |p| p.as_str().to_owned());

    let in_flight = gauge!(REQUESTS_IN_FLIGHT);
    in_flight.increment(1.0);
    let started = Instant::now();

    let response = next.run(request).await;

    let elapsed = started.elapsed().as_secs_f64();
    in_flight.decrement(1.0);

    let status = response.status();
    let class = format!("{}xx", status.as_u16() / 100);

    counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.as_u16().to_string(),
        "class" => class
    )
    .increment(1);
    histogram!(REQUEST_DURATION, "method" => method, "path" => path).record(elapsed);

    response
}

pub fn register_http_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Requests served, by route and status");
    describe_histogram!(REQUEST_DURATION, "Request latency in seconds, by route");
    describe_gauge!(REQUESTS_IN_FLIGHT, "Requests currently being handled");
}
