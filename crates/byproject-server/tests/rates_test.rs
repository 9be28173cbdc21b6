mod helpers;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use byproject_cache::CacheSettings;
use helpers::{DownRateSource, client, client_for, sample_translator, state_with};

#[tokio::test]
async fn rates_endpoint_returns_table_and_diagnostics() {
    let response = client().get("/rates").await;
    response.assert_status(StatusCode::OK);

    let body = response.json();
    assert_eq!(body["base"], "FCFA");
    assert_eq!(body["rates"]["FCFA"], 1.0);
    assert_eq!(body["rates"]["USD"], 600.0);
    assert_eq!(body["rates"]["EUR"], 655.0);
    assert_eq!(body["isLive"], true);
    assert_eq!(body["fallback"], false);
    assert_eq!(body["cacheAgeSeconds"], 0);
}

#[tokio::test]
async fn rates_endpoint_serves_default_table_when_source_is_down() {
    let source = Arc::new(DownRateSource::default());
    let client = client_for(state_with(
        source.clone(),
        Arc::new(sample_translator()),
        CacheSettings::default(),
    ));

    let body = client.get("/rates").await.json();
    assert_eq!(body["fallback"], true);
    assert_eq!(body["rates"]["GBP"], 765.0);

    // El fallback queda en cache: no se reintenta la fuente.
    client.get("/rates").await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_refetches_the_table() {
    let source = Arc::new(DownRateSource::default());
    let client = client_for(state_with(
        source.clone(),
        Arc::new(sample_translator()),
        CacheSettings::default(),
    ));

    client.get("/rates").await;
    client
        .post("/rates/refresh")
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn convert_usd_to_eur() {
    let response = client().get("/convert?amount=10&from=USD&to=EUR").await;
    response.assert_status(StatusCode::OK);

    let body = response.json();
    let amount = body["amount"].as_f64().unwrap();
    assert!((amount - 10.0 * 600.0 / 655.0).abs() < 1e-9);
    assert_eq!(body["currency"], "EUR");
    assert_eq!(body["originalAmount"], 10.0);
    assert_eq!(body["originalCurrency"], "USD");
    assert_eq!(body["status"]["kind"], "converted");
    assert_eq!(body["formatted"], "9 EUR (10 USD)");
}

#[tokio::test]
async fn convert_accepts_lowercase_codes() {
    let body = client()
        .get("/convert?amount=10&from=eur&to=fcfa")
        .await
        .json();

    assert_eq!(body["amount"], 6550.0);
    assert_eq!(body["formatted"], "6 550 FCFA (10 EUR)");
}

#[tokio::test]
async fn convert_same_currency_is_unchanged() {
    let body = client()
        .get("/convert?amount=42.5&from=EUR&to=EUR")
        .await
        .json();

    assert_eq!(body["amount"], 42.5);
    assert_eq!(body["status"]["kind"], "unchanged");
}

#[tokio::test]
async fn convert_unknown_rate_returns_original_amount() {
    let body = client()
        .get("/convert?amount=12&from=JPY&to=USD")
        .await
        .json();

    assert_eq!(body["amount"], 12.0);
    assert_eq!(body["currency"], "JPY");
    assert_eq!(body["status"]["kind"], "unconverted");
}

#[tokio::test]
async fn convert_rejects_negative_amount() {
    client()
        .get("/convert?amount=-5&from=USD&to=EUR")
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_body("non-negative");
}

#[tokio::test]
async fn convert_rejects_invalid_currency() {
    client()
        .get("/convert?amount=5&from=U$D&to=EUR")
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_body("Invalid currency code");
}

#[tokio::test]
async fn convert_requires_all_parameters() {
    client()
        .get("/convert?amount=5&from=USD")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
