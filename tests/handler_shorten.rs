mod common;

use axum::http::StatusCode;
use link_allocator::domain::entities::SubscriptionTier;
use link_allocator::domain::repositories::ShortCodeRepository;
use serde_json::json;

#[tokio::test]
async fn test_owner_length_four_example() {
    let (state, store) = common::create_test_state();
    let owner = common::create_owner(&store, SubscriptionTier::Free, 10).await;
    let server = common::test_server(state);

    let response = server
        .post("/api/shorten")
        .add_header("x-owner-id", owner.id.to_string())
        .json(&json!({
            "originalUrl": "https://example.com/x",
            "length": 4
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["success"], true);

    let short_url = json["shortenURL"].as_str().unwrap();
    let code = common::code_of(short_url);
    assert_eq!(code.len(), 4);
    assert!(code.chars().next().unwrap().is_ascii_alphabetic());
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));

    assert_eq!(common::quota_used(&store, owner.id).await, 1);

    let record = store.find_by_code(code).await.unwrap().unwrap();
    assert_eq!(record.original_url, "https://example.com/x");
    assert_eq!(record.owner_id, Some(owner.id));
    assert_eq!(record.clicks, 0);
}

#[tokio::test]
async fn test_prefix_and_alias() {
    let (state, store) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/shorten")
        .json(&json!({
            "originalUrl": "https://example.com/docs",
            "prefix": "go-",
            "alias": "docs"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["shortenURL"], "https://sho.rt/go-docs");

    let record = store.find_by_code("go-docs").await.unwrap().unwrap();
    assert_eq!(record.owner_id, None);
}

#[tokio::test]
async fn test_alias_in_use_conflict() {
    let (state, store) = common::create_test_state();
    let server = common::test_server(state);

    let body = json!({ "originalUrl": "https://example.com/a", "alias": "taken" });
    server
        .post("/api/shorten")
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "originalUrl": "https://example.com/b", "alias": "taken" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "alias_in_use");
    assert_eq!(json["details"]["alias"], "taken");

    assert_eq!(store.record_count(), 1);
    let record = store.find_by_code("taken").await.unwrap().unwrap();
    assert_eq!(record.original_url, "https://example.com/a");
}

#[tokio::test]
async fn test_same_owner_same_url_is_idempotent() {
    let (state, store) = common::create_test_state();
    let owner = common::create_owner(&store, SubscriptionTier::Basic, 10).await;
    let server = common::test_server(state);

    let body = json!({ "originalUrl": "https://example.com/dedup", "length": 6 });

    let first = server
        .post("/api/shorten")
        .add_header("x-owner-id", owner.id.to_string())
        .json(&body)
        .await;
    first.assert_status(StatusCode::CREATED);

    let second = server
        .post("/api/shorten")
        .add_header("x-owner-id", owner.id.to_string())
        .json(&json!({ "originalUrl": "https://example.com/dedup", "alias": "other" }))
        .await;
    second.assert_status_ok();

    let first = first.json::<serde_json::Value>();
    let second = second.json::<serde_json::Value>();
    assert_eq!(first["shortenURL"], second["shortenURL"]);

    assert_eq!(common::quota_used(&store, owner.id).await, 1);
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn test_self_referential_url_returned_unchanged() {
    let (state, store) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "originalUrl": "https://links.example.org/abc", "length": 6 }))
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["shortenURL"], "https://links.example.org/abc");
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn test_invalid_url_rejected() {
    let (state, store) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "originalUrl": "not a url", "length": 6 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "invalid_url");
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn test_empty_url_fails_validation() {
    let (state, _store) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "originalUrl": "", "length": 6 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["details"]["field"], "original_url");
}

#[tokio::test]
async fn test_length_out_of_range() {
    let (state, _store) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "originalUrl": "https://example.com", "length": 40 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "invalid_length");
    assert_eq!(json["details"]["provided"], 40);
}

#[tokio::test]
async fn test_past_expiry_rejected_for_paid_owner() {
    let (state, store) = common::create_test_state();
    let owner = common::create_owner(&store, SubscriptionTier::Enterprise, 0).await;
    let server = common::test_server(state);

    let response = server
        .post("/api/shorten")
        .add_header("x-owner-id", owner.id.to_string())
        .json(&json!({
            "originalUrl": "https://example.com",
            "length": 6,
            "expirationDate": common::days_from_now(-1)
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<serde_json::Value>()["error"], "expiry_in_past");
}

#[tokio::test]
async fn test_free_owner_expiry_capped_at_six_months() {
    let (state, store) = common::create_test_state();
    let owner = common::create_owner(&store, SubscriptionTier::Free, 10).await;
    let server = common::test_server(state);

    let response = server
        .post("/api/shorten")
        .add_header("x-owner-id", owner.id.to_string())
        .json(&json!({
            "originalUrl": "https://example.com",
            "length": 6,
            "expirationDate": common::days_from_now(400)
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "expiry_too_far");
    assert!(json["details"]["max"].is_string());
    assert_eq!(common::quota_used(&store, owner.id).await, 0);
}

#[tokio::test]
async fn test_anonymous_gets_default_expiry() {
    let (state, _store) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "originalUrl": "https://example.com", "length": 6 }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert!(response.json::<serde_json::Value>()["expiresAt"].is_string());
}

#[tokio::test]
async fn test_quota_exhausted() {
    let (state, store) = common::create_test_state();
    let owner = common::create_owner(&store, SubscriptionTier::Free, 1).await;
    let server = common::test_server(state);

    server
        .post("/api/shorten")
        .add_header("x-owner-id", owner.id.to_string())
        .json(&json!({ "originalUrl": "https://example.com/1", "length": 6 }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/shorten")
        .add_header("x-owner-id", owner.id.to_string())
        .json(&json!({ "originalUrl": "https://example.com/2", "length": 6 }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "quota_exceeded");
    assert_eq!(json["details"]["remaining"], 0);
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn test_unknown_owner_forbidden() {
    let (state, _store) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/shorten")
        .add_header("x-owner-id", "999")
        .json(&json!({ "originalUrl": "https://example.com", "length": 6 }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<serde_json::Value>()["error"], "unknown_owner");
}

#[tokio::test]
async fn test_malformed_owner_header() {
    let (state, _store) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/shorten")
        .add_header("x-owner-id", "abc")
        .json(&json!({ "originalUrl": "https://example.com", "length": 6 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["details"]["field"], "X-Owner-Id");
}

#[tokio::test]
async fn test_anonymous_rate_limited_per_ip() {
    let (state, _store) = common::create_limited_state(2);
    let server = common::test_server(state);

    for i in 0..2 {
        server
            .post("/api/shorten")
            .add_header("x-forwarded-for", "203.0.113.9")
            .json(&json!({ "originalUrl": format!("https://example.com/{i}"), "length": 6 }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server
        .post("/api/shorten")
        .add_header("x-forwarded-for", "203.0.113.9")
        .json(&json!({ "originalUrl": "https://example.com/3", "length": 6 }))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "rate_limited");
    assert!(json["details"]["resetAt"].is_string());

    server
        .post("/api/shorten")
        .add_header("x-forwarded-for", "198.51.100.1")
        .json(&json!({ "originalUrl": "https://example.com/3", "length": 6 }))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_owner_not_rate_limited() {
    let (state, store) = common::create_limited_state(1);
    let owner = common::create_owner(&store, SubscriptionTier::Premium, 0).await;
    let server = common::test_server(state);

    for i in 0..3 {
        server
            .post("/api/shorten")
            .add_header("x-owner-id", owner.id.to_string())
            .add_header("x-forwarded-for", "203.0.113.9")
            .json(&json!({ "originalUrl": format!("https://example.com/{i}"), "length": 6 }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    assert_eq!(common::quota_used(&store, owner.id).await, 3);
}
