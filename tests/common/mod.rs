#![allow(dead_code)]

use axum::Router;
use axum::routing::get;
use axum_test::TestServer;
use chrono::Utc;
use link_allocator::api;
use link_allocator::api::handlers::health_handler;
use link_allocator::config::{Config, StorageBackend};
use link_allocator::domain::entities::{NewOwner, NewRecord, Owner, SubscriptionTier};
use link_allocator::domain::repositories::{OwnerRepository, ShortCodeRepository};
use link_allocator::infrastructure::persistence::InMemoryStore;
use link_allocator::infrastructure::rate_limit::GovernorRateLimiter;
use link_allocator::state::AppState;
use std::num::NonZeroU32;
use std::sync::Arc;

pub const BASE_URL: &str = "https://sho.rt";

pub fn test_config() -> Config {
    Config {
        storage_backend: StorageBackend::Memory,
        database_url: None,
        listen_addr: "127.0.0.1:0".to_string(),
        base_url: BASE_URL.to_string(),
        self_domains: vec![BASE_URL.to_string(), "https://links.example.org".to_string()],
        max_prefix_length: 16,
        default_code_length: 6,
        anon_rate_per_minute: 60,
        anon_rate_burst: 1_000,
        behind_proxy: true,
        log_level: "debug".to_string(),
        log_format: "text".to_string(),
        db_max_connections: 1,
        db_connect_timeout: 1,
    }
}

/// State over a fresh in-memory store and a generous limiter.
pub fn create_test_state() -> (AppState, Arc<InMemoryStore>) {
    create_limited_state(1_000)
}

/// State whose anonymous limiter admits `burst` requests per IP.
pub fn create_limited_state(burst: u32) -> (AppState, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let limiter = GovernorRateLimiter::new(
        NonZeroU32::new(1).unwrap(),
        NonZeroU32::new(burst).unwrap(),
    );

    let state = AppState::new(
        store.clone(),
        store.clone(),
        Arc::new(limiter),
        &test_config(),
    );

    (state, store)
}

pub fn test_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api::routes::api_routes())
        .with_state(state)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(test_router(state)).unwrap()
}

pub async fn create_owner(store: &InMemoryStore, tier: SubscriptionTier, limit: i64) -> Owner {
    let mut new_owner = NewOwner::with_tier(tier);
    new_owner.quota_limit = limit;
    store.create(new_owner).await.unwrap()
}

pub async fn quota_used(store: &InMemoryStore, owner_id: i64) -> i64 {
    store.find_by_id(owner_id).await.unwrap().unwrap().quota_used
}

/// Code part of a rendered short URL.
pub fn code_of(short_url: &str) -> &str {
    short_url
        .strip_prefix(BASE_URL)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap()
}

pub fn days_from_now(days: i64) -> String {
    (Utc::now() + chrono::Duration::days(days)).to_rfc3339()
}

/// Occupies every one-character code so length-1 generation cannot succeed.
pub async fn occupy_single_letter_codes(store: &InMemoryStore) {
    for letter in ('A'..='Z').chain('a'..='z') {
        store
            .insert(NewRecord {
                original_url: format!("https://example.com/taken/{letter}"),
                short_code: letter.to_string(),
                owner_id: None,
                created_at: Utc::now(),
                expires_at: None,
            })
            .await
            .unwrap();
    }
}
