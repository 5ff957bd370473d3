//! Tests for the storefront catalog listing.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn api(server: &MockServer) -> PrestaShopApi {
    PrestaShopApi::with_base_url(&server.uri(), "KEY123", 4)
}

#[tokio::test]
async fn fetch_catalog_normalizes_empty_ean_to_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("Output-Format", "JSON"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                {"id": 5, "ean13": "111"},
                {"id": 6, "ean13": ""},
                {"id": 7}
            ]
        })))
        .mount(&server)
        .await;

    let entries = api(&server).fetch_catalog().await.unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].product_id, "5");
    assert_eq!(entries[0].key.as_deref(), Some("111"));
    assert_eq!(entries[1].product_id, "6");
    assert_eq!(entries[1].key, None);
    assert_eq!(entries[2].product_id, "7");
    assert_eq!(entries[2].key, None);
}

#[tokio::test]
async fn fetch_catalog_accepts_string_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [{"id": "42", "ean13": "999"}]
        })))
        .mount(&server)
        .await;

    let entries = api(&server).fetch_catalog().await.unwrap();
    assert_eq!(entries[0].product_id, "42");
}

#[tokio::test]
async fn fetch_catalog_error_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = api(&server).fetch_catalog().await;
    match result.unwrap_err() {
        SyncError::HttpStatus(status) => assert!(status.is_server_error()),
        other => panic!("Expected SyncError::HttpStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn empty_listing_yields_empty_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .mount(&server)
        .await;

    let entries = api(&server).fetch_catalog().await.unwrap();
    assert!(entries.is_empty());
}
