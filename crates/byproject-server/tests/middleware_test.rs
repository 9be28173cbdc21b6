//! Tests de middleware.

mod helpers;

use helpers::client;
use uuid::Uuid;

#[tokio::test]
async fn response_includes_request_id() {
    client()
        .get("/health")
        .await
        .assert_header_exists("x-request-id");
}

#[tokio::test]
async fn request_id_is_uuid_v4() {
    let response = client().get("/health").await;

    let id = response.header("x-request-id").unwrap();
    let parsed = Uuid::parse_str(id).unwrap();

    assert_eq!(parsed.get_version_num(), 4);
}

#[tokio::test]
async fn propagates_incoming_request_id() {
    let custom_id = "my-custom-request-id-12345";

    client()
        .get_with_headers("/health", vec![("x-request-id", custom_id)])
        .await
        .assert_header("x-request-id", custom_id);
}

#[tokio::test]
async fn generates_different_ids_for_each_request() {
    let client = client();
    let first = client.get("/health").await;
    let second = client.get("/health").await;

    assert_ne!(
        first.header("x-request-id").unwrap(),
        second.header("x-request-id").unwrap()
    );
}

#[tokio::test]
async fn request_id_present_on_errors() {
    client()
        .get("/convert?amount=-1&from=USD&to=EUR")
        .await
        .assert_header_exists("x-request-id");
}

#[tokio::test]
async fn request_id_present_on_unknown_routes() {
    let response = client().get("/does/not/exist").await;

    assert_eq!(response.status, axum::http::StatusCode::NOT_FOUND);
    response.assert_header_exists("x-request-id");
}
