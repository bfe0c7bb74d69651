mod common;

use async_trait::async_trait;
use serde_json::Value;
use shortener_service::infrastructure::cache::{CacheError, CacheResult, KeyValueStore};
use std::sync::Arc;
use std::time::Duration;

struct UnreachableStore;

#[async_trait]
impl KeyValueStore for UnreachableStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }
    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }
    async fn health_check(&self) -> bool {
        false
    }
    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = common::spawn_app(common::test_config());

    let response = app.server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let app = common::spawn_app(common::test_config());

    let json = app.server.get("/health").await.json::<Value>();

    assert!(json["status"].is_string());
    assert!(json["version"].is_string());
    assert!(json["checks"].is_object());
    assert!(json["checks"]["database"].is_object());
    assert!(json["checks"]["cache"].is_object());
    assert!(json["checks"]["click_queue"].is_object());
    assert!(json["checks"]["existence_filter"].is_object());
    assert_eq!(json["checks"]["cache"]["message"], "memory connected");
}

#[tokio::test]
async fn test_health_reports_filter_population() {
    let app = common::spawn_app(common::test_config());

    app.server
        .post("/shorten")
        .json(&serde_json::json!({ "url": "https://example.com" }))
        .await
        .assert_status_ok();

    let json = app.server.get("/health").await.json::<Value>();
    let message = json["checks"]["existence_filter"]["message"]
        .as_str()
        .unwrap();

    assert!(message.starts_with("1 of "));
}

#[tokio::test]
async fn test_health_degraded_when_cache_unreachable() {
    let config = common::test_config();
    let repository = Arc::new(common::InMemoryUrlRepository::new());
    let (state, _clicks) =
        common::create_test_state(&config, repository, Arc::new(UnreachableStore));
    let server = common::make_server(state);

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);

    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["cache"]["status"], "error");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_health_degraded_when_click_queue_closed() {
    let config = common::test_config();
    let repository = Arc::new(common::InMemoryUrlRepository::new());
    let store = Arc::new(shortener_service::infrastructure::cache::MemoryStore::new());
    let (state, clicks) = common::create_test_state(&config, repository, store);
    drop(clicks);
    let server = common::make_server(state);

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);
    assert_eq!(
        response.json::<Value>()["checks"]["click_queue"]["status"],
        "error"
    );
}
