#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::json;
use shortener_service::config::Config;
use shortener_service::domain::click_event::ClickEvent;
use shortener_service::domain::entities::{Click, ClickStats, NewClick, NewShortUrl, ShortUrl};
use shortener_service::domain::repositories::{ClickRepository, UrlRepository};
use shortener_service::error::AppError;
use shortener_service::infrastructure::cache::{KeyValueStore, MemoryStore};
use shortener_service::infrastructure::existence_filter::ExistenceFilter;
use shortener_service::routes::router;
use shortener_service::state::AppState;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use tokio::sync::{Barrier, mpsc};
use tower::Layer;

/// In-memory stand-in for the PostgreSQL repository.
///
/// Enforces code uniqueness the way the database constraint does.
#[derive(Default)]
pub struct InMemoryUrlRepository {
    urls: Mutex<HashMap<String, ShortUrl>>,
    next_id: AtomicI64,
    writes: AtomicUsize,
    exists_barrier: Option<Barrier>,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `exists_by_code` call waits until `n` callers have read.
    pub fn with_exists_barrier(n: usize) -> Self {
        Self {
            exists_barrier: Some(Barrier::new(n)),
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn get(&self, code: &str) -> Option<ShortUrl> {
        self.urls.lock().get(code).cloned()
    }

    /// Inserts a record directly, bypassing the service.
    pub fn seed(&self, code: &str, url: &str, expires_at: Option<DateTime<Utc>>) {
        let now = Utc::now();
        let record = ShortUrl {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            short_code: code.to_string(),
            original_url: url.to_string(),
            expires_at,
            created_at: now,
            updated_at: now,
        };
        self.urls.lock().insert(code.to_string(), record);
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn create(&self, new_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let mut urls = self.urls.lock();
        if urls.contains_key(&new_url.short_code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "urls_short_code_key" }),
            ));
        }

        let now = Utc::now();
        let record = ShortUrl {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            short_code: new_url.short_code.clone(),
            original_url: new_url.original_url,
            expires_at: new_url.expires_at,
            created_at: now,
            updated_at: now,
        };
        urls.insert(new_url.short_code, record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(record)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        Ok(self.get(code))
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError> {
        let exists = self.urls.lock().contains_key(code);
        if let Some(barrier) = &self.exists_barrier {
            barrier.wait().await;
        }
        Ok(exists)
    }

    async fn list_codes(&self) -> Result<Vec<String>, AppError> {
        Ok(self.urls.lock().keys().cloned().collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.urls.lock().len() as i64)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// In-memory stand-in for the click table.
#[derive(Default)]
pub struct InMemoryClickRepository {
    clicks: Mutex<Vec<Click>>,
    next_id: AtomicI64,
}

impl InMemoryClickRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.clicks.lock().len()
    }

    /// Records a click for `code` from `ip` at `clicked_at`.
    pub fn seed(&self, code: &str, ip: Option<&str>, clicked_at: DateTime<Utc>) {
        self.insert(NewClick {
            short_code: code.to_string(),
            ip: ip.map(str::to_string),
            user_agent: None,
            referer: None,
            clicked_at,
        });
    }

    fn insert(&self, new_click: NewClick) -> Click {
        let click = Click {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            short_code: new_click.short_code,
            ip: new_click.ip,
            user_agent: new_click.user_agent,
            referer: new_click.referer,
            clicked_at: new_click.clicked_at,
        };
        self.clicks.lock().push(click.clone());
        click
    }
}

#[async_trait]
impl ClickRepository for InMemoryClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        Ok(self.insert(new_click))
    }

    async fn count(&self, short_code: Option<String>) -> Result<i64, AppError> {
        let clicks = self.clicks.lock();
        let count = match short_code {
            Some(code) => clicks.iter().filter(|c| c.short_code == code).count(),
            None => clicks.len(),
        };
        Ok(count as i64)
    }

    async fn stats(&self, short_code: &str) -> Result<ClickStats, AppError> {
        let clicks = self.clicks.lock();
        let matching: Vec<&Click> = clicks.iter().filter(|c| c.short_code == short_code).collect();
        let unique_ips: HashSet<&str> = matching.iter().filter_map(|c| c.ip.as_deref()).collect();

        Ok(ClickStats {
            total_clicks: matching.len() as i64,
            unique_ips: unique_ips.len() as i64,
            last_click: matching.iter().map(|c| c.clicked_at).max(),
        })
    }

    async fn recent(&self, short_code: &str, limit: i64) -> Result<Vec<Click>, AppError> {
        let mut matching: Vec<Click> = self
            .clicks
            .lock()
            .iter()
            .filter(|c| c.short_code == short_code)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at).then(b.id.cmp(&a.id)));
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }
}

/// Injects a fixed peer address, as `into_make_service_with_connect_info` does.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// Configuration with a generous rate limit so ordinary tests never hit it.
pub fn test_config() -> Config {
    Config {
        rate_limit_max: 10_000,
        bloom_n: 10_000,
        bloom_p: 0.001,
        domain: "https://sho.rt".to_string(),
        ..Config::default()
    }
}

pub fn create_test_state(
    config: &Config,
    repository: Arc<InMemoryUrlRepository>,
    store: Arc<dyn KeyValueStore>,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    create_test_state_with_clicks(
        config,
        repository,
        Arc::new(InMemoryClickRepository::new()),
        store,
    )
}

pub fn create_test_state_with_clicks(
    config: &Config,
    repository: Arc<InMemoryUrlRepository>,
    click_repository: Arc<InMemoryClickRepository>,
    store: Arc<dyn KeyValueStore>,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let filter = Arc::new(ExistenceFilter::new(config.bloom_n, config.bloom_p).unwrap());
    let (tx, rx) = mpsc::channel(100);
    let state = AppState::new(config, repository, click_repository, store, filter, tx);
    (state, rx)
}

pub fn make_server(state: AppState) -> TestServer {
    TestServer::new(router(state).layer(MockConnectInfoLayer)).unwrap()
}

/// Test server over a fresh repository and in-process store.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub repository: Arc<InMemoryUrlRepository>,
    pub store: Arc<MemoryStore>,
    pub click_repository: Arc<InMemoryClickRepository>,
    pub clicks: mpsc::Receiver<ClickEvent>,
}

pub fn spawn_app(config: Config) -> TestApp {
    let repository = Arc::new(InMemoryUrlRepository::new());
    let store = Arc::new(MemoryStore::new());
    let click_repository = Arc::new(InMemoryClickRepository::new());
    let (state, clicks) = create_test_state_with_clicks(
        &config,
        repository.clone(),
        click_repository.clone(),
        store.clone(),
    );

    TestApp {
        server: make_server(state.clone()),
        state,
        repository,
        store,
        click_repository,
        clicks,
    }
}
