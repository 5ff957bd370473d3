//! Tests for the concurrent offer-fetch pipeline.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn listing_json(ids: &[&str], total: u64) -> serde_json::Value {
    json!({
        "offers": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
        "totalCount": total
    })
}

fn detail_json(ean: Option<&str>, amount: &str, external_id: Option<&str>) -> serde_json::Value {
    let parameters = match ean {
        Some(value) => json!([
            {"id": "11323", "values": ["irrelevant"]},
            {"id": "225693", "values": [value]}
        ]),
        None => json!([{"id": "11323", "values": ["irrelevant"]}]),
    };
    let external = match external_id {
        Some(id) => json!({"id": id}),
        None => serde_json::Value::Null,
    };
    json!({
        "external": external,
        "parameters": parameters,
        "sellingMode": {"price": {"amount": amount, "currency": "PLN"}}
    })
}

fn api(server: &MockServer) -> AllegroApi {
    AllegroApi::with_base_url(&server.uri(), "test-token".to_string(), 4, 1000)
}

async fn mount_probe(server: &MockServer, total: u64) {
    Mock::given(method("GET"))
        .and(path("/sale/offers"))
        .and(query_param("limit", "1"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_json(&["probe"], total)))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, offset: u64, ids: &[&str], total: u64) {
    Mock::given(method("GET"))
        .and(path("/sale/offers"))
        .and(query_param("limit", "1000"))
        .and(query_param("offset", offset.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_json(ids, total)))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/sale/offers/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn offer_count_reads_total_from_probe() {
    let server = MockServer::start().await;
    mount_probe(&server, 57).await;

    let count = api(&server).offer_count().await.unwrap();
    assert_eq!(count, 57);
}

#[tokio::test]
async fn offer_count_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sale/offers"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = api(&server).fetch_all().await;
    match result.unwrap_err() {
        SyncError::HttpStatus(status) => assert_eq!(status.as_u16(), 401),
        other => panic!("Expected SyncError::HttpStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_all_resolves_and_classifies_offers() {
    let server = MockServer::start().await;
    mount_probe(&server, 3).await;
    mount_page(&server, 0, &["9", "10", "11"], 3).await;
    mount_detail(&server, "9", detail_json(Some("111"), "123.00", None)).await;
    mount_detail(&server, "10", detail_json(Some("222"), "50.00", Some("*"))).await;
    mount_detail(&server, "11", detail_json(None, "10.00", Some("ref-11"))).await;

    let outcome = api(&server).fetch_all().await.unwrap();

    assert_eq!(outcome.skipped, 1);
    let mut offers = outcome.offers;
    offers.sort_by(|a, b| a.offer_id.cmp(&b.offer_id));
    assert_eq!(offers.len(), 2);

    assert_eq!(offers[0].offer_id, "11");
    assert_eq!(offers[0].key, None);
    assert!((offers[0].price - 10.0).abs() < 0.001);

    assert_eq!(offers[1].offer_id, "9");
    assert_eq!(offers[1].key.as_deref(), Some("111"));
    assert!((offers[1].price - 123.0).abs() < 0.001);
}

#[tokio::test]
async fn blacklisted_offers_increment_skip_per_occurrence() {
    let server = MockServer::start().await;
    mount_probe(&server, 2).await;
    mount_page(&server, 0, &["1", "2"], 2).await;
    mount_detail(&server, "1", detail_json(Some("111"), "10.00", Some("*"))).await;
    mount_detail(&server, "2", detail_json(Some("222"), "20.00", Some("*"))).await;

    let outcome = api(&server).fetch_all().await.unwrap();
    assert!(outcome.offers.is_empty());
    assert_eq!(outcome.skipped, 2);
}

#[tokio::test]
async fn failed_page_is_skipped_and_fetching_continues() {
    let server = MockServer::start().await;
    mount_probe(&server, 1001).await;
    Mock::given(method("GET"))
        .and(path("/sale/offers"))
        .and(query_param("limit", "1000"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, 1000, &["7"], 1001).await;
    mount_detail(&server, "7", detail_json(Some("777"), "7.00", None)).await;

    let outcome = api(&server).fetch_all().await.unwrap();
    assert_eq!(outcome.offers.len(), 1);
    assert_eq!(outcome.offers[0].offer_id, "7");
}

#[tokio::test]
async fn detail_http_error_drops_offer_without_retry() {
    let server = MockServer::start().await;
    mount_probe(&server, 1).await;
    mount_page(&server, 0, &["5"], 1).await;
    Mock::given(method("GET"))
        .and(path("/sale/offers/5"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = api(&server).fetch_all().await.unwrap();
    assert!(outcome.offers.is_empty());
    assert_eq!(outcome.skipped, 0);
}

#[tokio::test]
async fn malformed_detail_body_drops_offer() {
    let server = MockServer::start().await;
    mount_probe(&server, 1).await;
    mount_page(&server, 0, &["5"], 1).await;
    Mock::given(method("GET"))
        .and(path("/sale/offers/5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&server)
        .await;

    let outcome = api(&server).fetch_all().await.unwrap();
    assert!(outcome.offers.is_empty());
}
