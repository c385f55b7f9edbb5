//! Tests for the paginated fetch engine

use super::*;
use crate::config::ClientConfig;
use crate::transport::HelixTransport;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer) -> Arc<dyn Fetch> {
    Arc::new(HelixTransport::new(&ClientConfig::new("abc123")).with_base_url(server.uri()))
}

fn page(ids: &[&str], cursor: Option<&str>) -> serde_json::Value {
    let mut envelope = json!({
        "data": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
        "pagination": {},
    });
    if let Some(cursor) = cursor {
        envelope["pagination"]["cursor"] = json!(cursor);
    }
    envelope
}

#[tokio::test]
async fn test_two_pages_then_exhaustion() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .and(query_param("after", "C1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["3", "4"], None)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["1", "2"], Some("C1"))))
        .mount(&server)
        .await;

    let mut cursor = Cursor::new(
        transport(&server),
        "streams",
        Params::new(),
        ResourceKind::Stream,
    );

    let mut ids = Vec::new();
    while let Some(record) = cursor.advance().await.unwrap() {
        ids.push(record.get_str("id").unwrap().to_string());
    }
    assert_eq!(ids, vec!["1", "2", "3", "4"]);

    // Keep pulling: still exhausted and no extra requests
    assert!(cursor.advance().await.unwrap().is_none());
    assert!(cursor.advance().await.unwrap().is_none());
    assert_eq!(cursor.requests_issued(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_second_request_injects_after_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .and(query_param("after", "C1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["2"], None)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["1"], Some("C1"))))
        .expect(1)
        .mount(&server)
        .await;

    let mut cursor = Cursor::new(
        transport(&server),
        "streams",
        Params::new(),
        ResourceKind::Stream,
    );

    assert!(cursor.advance().await.unwrap().is_some());
    assert_eq!(cursor.cursor(), Some("C1"));
    assert!(cursor.advance().await.unwrap().is_some());
    assert!(cursor.advance().await.unwrap().is_none());

    // The first request must not carry an `after` param at all
    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].url.query().unwrap_or("").contains("after"));
}

#[tokio::test]
async fn test_buffered_records_need_no_io() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&["1", "2", "3"], Some("C1"))),
        )
        .mount(&server)
        .await;

    let mut cursor = Cursor::new(
        transport(&server),
        "streams",
        Params::new(),
        ResourceKind::Stream,
    );

    // One page satisfies three advances with a single request
    for _ in 0..3 {
        assert!(cursor.advance().await.unwrap().is_some());
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_page_terminates_sequence() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[], Some("C1"))))
        .mount(&server)
        .await;

    let mut cursor = Cursor::new(
        transport(&server),
        "streams",
        Params::new(),
        ResourceKind::Stream,
    );

    assert!(cursor.advance().await.unwrap().is_none());
    assert!(cursor.advance().await.unwrap().is_none());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_total_reported_when_envelope_carries_it() {
    let server = MockServer::start().await;

    let mut envelope = page(&["1"], None);
    envelope["total"] = json!(12345);

    Mock::given(method("GET"))
        .and(path("/users/follows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope))
        .mount(&server)
        .await;

    let mut cursor = Cursor::new(
        transport(&server),
        "users/follows",
        Params::new(),
        ResourceKind::Follow,
    );

    // Contract: total is unknown until a response carried it
    assert!(matches!(
        cursor.total(),
        Err(crate::Error::TotalNotProvided)
    ));

    cursor.advance().await.unwrap();
    assert_eq!(cursor.total().unwrap(), 12345);
}

#[tokio::test]
async fn test_failed_fetch_leaves_state_unchanged_and_is_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["1"], None)))
        .mount(&server)
        .await;

    let mut cursor = Cursor::new(
        transport(&server),
        "streams",
        Params::new(),
        ResourceKind::Stream,
    );

    assert!(cursor.advance().await.is_err());
    assert_eq!(cursor.requests_issued(), 0);

    // Same advance retried by the caller succeeds
    let record = cursor.advance().await.unwrap().unwrap();
    assert_eq!(record.get_str("id"), Some("1"));
}

#[tokio::test]
async fn test_collect_respects_limit_on_endless_cursor() {
    let server = MockServer::start().await;

    // Server always returns a cursor: the sequence is conceptually infinite
    Mock::given(method("GET"))
        .and(path("/streams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["1", "2"], Some("C"))))
        .mount(&server)
        .await;

    let mut cursor = Cursor::new(
        transport(&server),
        "streams",
        Params::new(),
        ResourceKind::Stream,
    );

    let records = cursor.collect(5).await.unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_stream_yields_records_across_pages() {
    use futures::TryStreamExt;

    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .and(query_param("after", "C1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["3"], None)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["1", "2"], Some("C1"))))
        .mount(&server)
        .await;

    let cursor = Cursor::new(
        transport(&server),
        "streams",
        Params::new(),
        ResourceKind::Stream,
    );

    let ids: Vec<String> = cursor
        .into_stream()
        .map_ok(|record| record.get_str("id").unwrap().to_string())
        .try_collect()
        .await
        .unwrap();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_page_fetcher_maps_data_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("name", "PLAYERUNKNOWN'S BATTLEGROUNDS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "493057", "name": "PLAYERUNKNOWN'S BATTLEGROUNDS"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut params = Params::new();
    params.set("name", "PLAYERUNKNOWN'S BATTLEGROUNDS");

    let records = PageFetcher::new(transport(&server), "games", params, ResourceKind::Game)
        .fetch()
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind(), ResourceKind::Game);
    assert_eq!(records[0].get_str("id"), Some("493057"));
}

#[tokio::test]
async fn test_page_fetcher_reads_alternate_envelope_key() {
    use crate::transport::KrakenTransport;

    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/top"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vods": [{"_id": "v106400740", "title": "to Cerge's"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport: Arc<dyn Fetch> =
        Arc::new(KrakenTransport::new(&ClientConfig::new("abc123")).with_base_url(server.uri()));
    let records = PageFetcher::new(transport, "videos/top", Params::new(), ResourceKind::Video)
        .with_data_key("vods")
        .fetch()
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get_str("id"), Some("v106400740"));
}

#[tokio::test]
async fn test_missing_data_array_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/games"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let result = PageFetcher::new(
        transport(&server),
        "games",
        Params::new(),
        ResourceKind::Game,
    )
    .fetch()
    .await;

    assert!(matches!(result, Err(crate::Error::Other(_))));
}
