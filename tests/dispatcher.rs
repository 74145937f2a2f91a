//! Request dispatcher tests.
//!
//! Uses wiremock to check what goes over the wire and how the session
//! reacts to what comes back.

use chrono::{TimeZone, Utc};
use favroapi::{
    Card, Credentials, FavroClient, FavroError, Get, List, Method, Organization, RequestBody,
    RequestOptions, ResponseBody,
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{any, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials::new("me@example.com", "test-token").unwrap()
}

fn client_for(server: &MockServer) -> FavroClient {
    FavroClient::new(credentials(), &server.uri())
        .unwrap()
        .with_organization("org-1")
}

fn card_json(id: &str) -> serde_json::Value {
    json!({
        "cardId": id,
        "cardCommonId": format!("common-{id}"),
        "organizationId": "org-1",
        "name": format!("Card {id}"),
    })
}

#[tokio::test]
async fn test_standard_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/c1"))
        .and(header("Host", "favro.com"))
        .and(header("Authorization", credentials().basic_auth().as_str()))
        .and(header("organizationId", "org-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(card_json("c1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let card = Card::get(&client, "c1").await.unwrap();

    assert_eq!(card.name, "Card c1");
}

#[tokio::test]
async fn test_organization_header_left_off_when_excluded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/organizations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "limit": 100, "page": 0, "pages": 1, "requestId": "r1",
            "entities": [{"organizationId": "org-1", "name": "Acme"}]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut organizations = Organization::list(&client, &()).unwrap();
    let all = organizations.all_entities().await.unwrap();
    assert_eq!(all.len(), 1);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("organizationId").is_none());
}

#[tokio::test]
async fn test_session_adopts_response_metadata() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/c1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(card_json("c1"))
                .insert_header("X-RateLimit-Remaining", "41")
                .insert_header("X-RateLimit-Reset", "2030-01-01T00:00:00Z")
                .insert_header("X-Favro-Backend-Identifier", "shard-7"),
        )
        .mount(&mock_server)
        .await;

    // Later requests must be routed to the backend seen last
    Mock::given(method("GET"))
        .and(path("/cards/c2"))
        .and(header("X-Favro-Backend-Identifier", "shard-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(card_json("c2")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    Card::get(&client, "c1").await.unwrap();

    let session = client.session();
    assert_eq!(session.requests_remaining, Some(41));
    assert_eq!(session.backend_id.as_deref(), Some("shard-7"));
    assert_eq!(
        session.limit_resets_at,
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    );

    // A clone shares the session
    let clone = client.clone();
    assert_ok!(Card::get(&clone, "c2").await);
}

#[tokio::test]
async fn test_absent_headers_keep_previous_values() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/c1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(card_json("c1"))
                .insert_header("X-RateLimit-Remaining", "10")
                .insert_header("X-Favro-Backend-Identifier", "shard-1"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cards/c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(card_json("c2")))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    Card::get(&client, "c1").await.unwrap();
    Card::get(&client, "c2").await.unwrap();

    let session = client.session();
    assert_eq!(session.requests_remaining, Some(10));
    assert_eq!(session.backend_id.as_deref(), Some("shard-1"));
}

#[tokio::test]
async fn test_rate_limited_response_pins_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({"message": "Too many requests"}))
                .insert_header("X-RateLimit-Reset", "2030-06-01T12:00:00Z"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let err = Card::get(&client, "c1").await.unwrap_err();
    match err {
        FavroError::RateLimited { resets_at } => {
            assert_eq!(resets_at, Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap());
        }
        other => panic!("Expected RateLimited, got {other:?}"),
    }
    assert!(client.session().is_exhausted());

    // Refused locally; wiremock verifies only one request arrived
    let err = Card::get(&client, "c2").await.unwrap_err();
    assert!(matches!(err, FavroError::BudgetExhausted { .. }));
    assert!(err.is_precondition());
}

#[tokio::test]
async fn test_zero_remaining_refuses_next_request() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(card_json("c1"))
                .insert_header("X-RateLimit-Remaining", "0"),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert_ok!(Card::get(&client, "c1").await);
    assert_err!(Card::get(&client, "c1").await);

    // Only an explicit reset lets requests out again
    client.reset_budget();
    assert_ok!(Card::get(&client, "c1").await);
}

#[tokio::test]
async fn test_negative_remaining_clamps_to_zero() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(card_json("c1"))
                .insert_header("X-RateLimit-Remaining", "-3"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    Card::get(&client, "c1").await.unwrap();

    assert_eq!(client.session().requests_remaining, Some(0));
}

#[tokio::test]
async fn test_failed_status_still_updates_session() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"message": "Internal error"}))
                .insert_header("X-RateLimit-Remaining", "5"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = Card::get(&client, "c1").await.unwrap_err();

    match err {
        FavroError::ApiError {
            message,
            status_code,
        } => {
            assert_eq!(message, "Internal error");
            assert_eq!(status_code, Some(500));
        }
        other => panic!("Expected ApiError, got {other:?}"),
    }
    assert_eq!(client.session().requests_remaining, Some(5));
}

#[tokio::test]
async fn test_accepted_status_is_returned() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .request("cards", RequestOptions::new().accept_status(409))
        .await
        .unwrap();

    assert_eq!(response.status(), 409);
    assert!(response.failed());
    assert_eq!(response.text(), "conflict");
}

#[tokio::test]
async fn test_get_with_body_is_refused_before_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    for verb in [Method::Get, Method::Delete] {
        let options = RequestOptions::new()
            .method(verb)
            .json(json!({"name": "nope"}));
        let err = client.request("cards", options).await.unwrap_err();
        assert!(matches!(err, FavroError::BodyNotAllowed { .. }));
    }
}

#[tokio::test]
async fn test_organization_required_without_one() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = FavroClient::new(credentials(), &mock_server.uri()).unwrap();
    let err = Card::get(&client, "c1").await.unwrap_err();

    assert!(matches!(err, FavroError::OrganizationRequired));
}

#[tokio::test]
async fn test_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "No card found"})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = Card::get(&client, "missing").await.unwrap_err();

    match err {
        FavroError::NotFound { entity_type, id } => {
            assert_eq!(entity_type, "Card");
            assert_eq!(id, "missing");
        }
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_parses_to_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>maintenance</html>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.request("cards", RequestOptions::new()).await.unwrap();

    assert!(response.succeeded());
    assert!(response.parsed_body().unwrap().is_none());
    assert!(response.entities_data().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_json_body_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{not json", "application/json"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.request("cards/c1", RequestOptions::new()).await.unwrap();
    assert!(matches!(
        response.parsed_body(),
        Err(FavroError::InvalidBody { .. })
    ));

    let err = Card::get(&client, "c1").await.unwrap_err();
    match err {
        FavroError::InvalidBody { content, .. } => assert_eq!(content, "{not json"),
        other => panic!("Expected InvalidBody, got {other:?}"),
    }
}

#[tokio::test]
async fn test_body_shapes_are_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(card_json("c1")))
        .mount(&mock_server)
        .await;
    Mock::given(path("/array"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([card_json("a"), card_json("b")])),
        )
        .mount(&mock_server)
        .await;
    Mock::given(path("/paged"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "limit": 1, "page": 0, "pages": 2, "requestId": "r1",
            "entities": [card_json("a")]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let single = client.request("single", RequestOptions::new()).await.unwrap();
    assert!(matches!(
        single.parsed_body().unwrap(),
        Some(ResponseBody::Single(_))
    ));
    assert!(single.is_last_page().unwrap());

    let array = client.request("array", RequestOptions::new()).await.unwrap();
    assert_eq!(array.entities_data().unwrap().len(), 2);
    assert!(array.is_last_page().unwrap());

    let paged = client.request("paged", RequestOptions::new()).await.unwrap();
    assert!(matches!(
        paged.parsed_body().unwrap(),
        Some(ResponseBody::Paged(_))
    ));
    assert!(!paged.is_last_page().unwrap());
}

#[tokio::test]
async fn test_markdown_body_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/cards/c1"))
        .and(header("Content-Type", "text/markdown"))
        .and(body_string("# Release notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(card_json("c1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let options = RequestOptions::new()
        .method(Method::Put)
        .body(RequestBody::Markdown("# Release notes".to_string()));
    assert_ok!(client.request("cards/c1", options).await);
}

#[tokio::test]
async fn test_query_params_are_appended() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards"))
        .and(query_param("widgetCommonId", "w1"))
        .and(query_param("unique", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let options = RequestOptions::new()
        .query("widgetCommonId", "w1")
        .query_opt("unique", Some(true))
        .query_opt("archived", None::<bool>);
    let response = client.request("cards", options).await.unwrap();

    assert_eq!(response.url().query(), Some("widgetCommonId=w1&unique=true"));
}
