mod common;

use async_trait::async_trait;
use serde_json::{Value, json};
use shortener_service::config::Config;
use shortener_service::infrastructure::cache::{CacheError, CacheResult, KeyValueStore};
use std::sync::Arc;
use std::time::Duration;

fn limited_config(max: usize) -> Config {
    Config {
        rate_limit_max: max,
        rate_limit_window_seconds: 60,
        ..common::test_config()
    }
}

struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::OperationError("READONLY".to_string()))
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::OperationError("READONLY".to_string()))
    }
    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }
    async fn health_check(&self) -> bool {
        false
    }
    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[tokio::test]
async fn test_requests_over_limit_are_rejected() {
    let app = common::spawn_app(limited_config(3));

    for _ in 0..3 {
        app.server.get("/unknown").await.assert_status_not_found();
    }

    let response = app.server.get("/unknown").await;

    assert_eq!(response.status_code(), 429);
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "rate_limited");
    assert_eq!(json["error"]["details"]["limit"], 3);
    assert_eq!(json["error"]["details"]["window_seconds"], 60);
}

#[tokio::test]
async fn test_limit_is_shared_across_endpoints() {
    let app = common::spawn_app(limited_config(2));

    app.server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .assert_status_ok();
    app.server.get("/missing").await.assert_status_not_found();

    let response = app
        .server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com/again" }))
        .await;

    assert_eq!(response.status_code(), 429);
    assert_eq!(app.repository.writes(), 1);
}

#[tokio::test]
async fn test_health_is_not_limited() {
    let app = common::spawn_app(limited_config(1));

    for _ in 0..5 {
        app.server.get("/health").await.assert_status_ok();
    }

    // The health checks did not consume the window.
    app.server.get("/missing").await.assert_status_not_found();
}

#[tokio::test]
async fn test_forwarded_clients_limited_separately_behind_proxy() {
    let config = Config {
        behind_proxy: true,
        ..limited_config(1)
    };
    let app = common::spawn_app(config);

    app.server
        .get("/missing")
        .add_header("X-Forwarded-For", "198.51.100.1")
        .await
        .assert_status_not_found();
    app.server
        .get("/missing")
        .add_header("X-Forwarded-For", "198.51.100.2")
        .await
        .assert_status_not_found();

    let response = app
        .server
        .get("/missing")
        .add_header("X-Forwarded-For", "198.51.100.1")
        .await;
    assert_eq!(response.status_code(), 429);
}

#[tokio::test]
async fn test_forwarding_headers_ignored_without_proxy() {
    let app = common::spawn_app(limited_config(1));

    app.server
        .get("/missing")
        .add_header("X-Forwarded-For", "198.51.100.1")
        .await
        .assert_status_not_found();

    // Same socket peer, different claimed client: still the same identity.
    let response = app
        .server
        .get("/missing")
        .add_header("X-Forwarded-For", "198.51.100.2")
        .await;
    assert_eq!(response.status_code(), 429);
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let config = limited_config(10);
    let repository = Arc::new(common::InMemoryUrlRepository::new());
    let (state, _clicks) =
        common::create_test_state(&config, repository.clone(), Arc::new(FailingStore));
    let server = common::make_server(state);

    let response = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(response.json::<Value>()["error"]["code"], "internal_error");
    assert_eq!(repository.writes(), 0);
}
