mod helpers;

use axum::http::StatusCode;
use helpers::client;
use serde_json::json;

#[tokio::test]
async fn translate_returns_provider_text() {
    let response = client()
        .post_json(
            "/translate",
            json!({ "text": "Ciment", "sourceLanguage": "fr", "targetLanguage": "en" }),
        )
        .await;

    response.assert_status(StatusCode::OK);
    let body = response.json();
    assert_eq!(body["translatedText"], "Cement");
    assert_eq!(body["originalText"], "Ciment");
    assert_eq!(body["translated"], true);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn translate_defaults_source_to_french() {
    let body = client()
        .post_json("/translate", json!({ "text": "Ciment", "targetLanguage": "ZH" }))
        .await
        .json();

    assert_eq!(body["translatedText"], "水泥");
}

#[tokio::test]
async fn translate_failure_returns_original_text() {
    let response = client()
        .post_json(
            "/translate",
            json!({ "text": "Parpaing", "sourceLanguage": "fr", "targetLanguage": "en" }),
        )
        .await;

    response.assert_status(StatusCode::OK);
    let body = response.json();
    assert_eq!(body["translatedText"], "Parpaing");
    assert_eq!(body["translated"], false);
    assert!(body["error"].as_str().unwrap().contains("no static translation"));
}

#[tokio::test]
async fn translate_same_language_is_passthrough() {
    let body = client()
        .post_json(
            "/translate",
            json!({ "text": "Gravier", "sourceLanguage": "fr", "targetLanguage": "fr" }),
        )
        .await
        .json();

    assert_eq!(body["translatedText"], "Gravier");
    assert_eq!(body["translated"], true);
}

#[tokio::test]
async fn translate_rejects_unsupported_language() {
    client()
        .post_json("/translate", json!({ "text": "Ciment", "targetLanguage": "de" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_body("Unsupported language 'de'");
}

#[tokio::test]
async fn batch_preserves_order() {
    let response = client()
        .post_json(
            "/translate/batch",
            json!({ "items": [
                { "text": "Sable", "targetLanguage": "en" },
                { "text": "Ciment", "targetLanguage": "en", "context": "bag of 50 kg" },
                { "text": "Inconnu", "targetLanguage": "en" },
            ]}),
        )
        .await;

    response.assert_status(StatusCode::OK);
    let results = response.json()["results"].as_array().unwrap().clone();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["translatedText"], "Sand");
    assert_eq!(results[1]["translatedText"], "Cement");
    assert_eq!(results[2]["translated"], false);
}

#[tokio::test]
async fn batch_rejects_oversized_requests() {
    let items: Vec<_> = (0..101)
        .map(|i| json!({ "text": format!("texte {}", i), "targetLanguage": "en" }))
        .collect();

    client()
        .post_json("/translate/batch", json!({ "items": items }))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_body("at most 100");
}
