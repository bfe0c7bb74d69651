//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::mpsc;

use crate::application::services::{
    AnalyticsService, RateLimiter, ShortenerService, ShortenerSettings,
};
use crate::config::Config;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{ClickRepository, UrlRepository};
use crate::infrastructure::cache::{KeyValueStore, UrlCache};
use crate::infrastructure::existence_filter::ExistenceFilter;

#[derive(Clone)]
pub struct AppState {
    pub shortener: ShortenerService,
    pub analytics: AnalyticsService,
    pub rate_limiter: RateLimiter,
    pub repository: Arc<dyn UrlRepository>,
    pub cache: UrlCache,
    pub filter: Arc<ExistenceFilter>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    /// Read client IP from forwarding headers.
    pub behind_proxy: bool,
    /// Renders `GET /metrics`; `None` when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wires services from their collaborators.
    ///
    /// The same key-value store backs the URL cache and the rate-limit windows.
    pub fn new(
        config: &Config,
        repository: Arc<dyn UrlRepository>,
        clicks: Arc<dyn ClickRepository>,
        store: Arc<dyn KeyValueStore>,
        filter: Arc<ExistenceFilter>,
        click_sender: mpsc::Sender<ClickEvent>,
    ) -> Self {
        let cache = UrlCache::new(store.clone());
        let settings = ShortenerSettings {
            code_length: config.short_code_length,
            domain: config.domain.clone(),
            ..Default::default()
        };

        let shortener = ShortenerService::new(
            repository.clone(),
            cache.clone(),
            filter.clone(),
            click_sender.clone(),
            settings,
        );
        let analytics = AnalyticsService::new(clicks);
        let rate_limiter = RateLimiter::new(
            store,
            config.rate_limit_max,
            config.rate_limit_window(),
        );

        Self {
            shortener,
            analytics,
            rate_limiter,
            repository,
            cache,
            filter,
            click_sender,
            behind_proxy: config.behind_proxy,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
