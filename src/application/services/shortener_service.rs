//! Short URL creation and resolution service.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::click_event::{ClickEvent, ClickInfo};
use crate::domain::entities::NewShortUrl;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::UrlCache;
use crate::infrastructure::existence_filter::ExistenceFilter;
use crate::infrastructure::metrics::{
    CLICK_EVENTS_DROPPED_TOTAL, EXISTENCE_FILTER_REJECTIONS_TOTAL, REDIRECT_LATENCY_SECONDS,
};
use crate::utils::code_generator::{generate_code, validate_alias};
use crate::utils::url_validator::validate_url;

/// Maximum number of items accepted by [`ShortenerService::shorten_batch`].
pub const MAX_BATCH_SIZE: usize = 100;

/// Generation attempts before giving up with [`AppError::Generation`].
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Construction parameters of [`ShortenerService`].
#[derive(Debug, Clone)]
pub struct ShortenerSettings {
    /// Length of generated codes (4..=20).
    pub code_length: usize,
    /// Base of returned short URLs, e.g. `https://sho.rt`.
    pub domain: String,
    pub max_attempts: usize,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self {
            code_length: 8,
            domain: "http://localhost:8080".to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// A single shorten request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortenRequest {
    pub url: String,
    /// Lifetime in seconds from now. Not range-checked here: a non-positive
    /// value yields a mapping that is already expired.
    pub expires_in: Option<i64>,
    pub alias: Option<String>,
}

impl ShortenRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Result of a successful shorten.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortenedUrl {
    pub short_code: String,
    pub short_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Per-item outcome of a batch shorten.
#[derive(Debug)]
pub struct BatchResult {
    pub url: String,
    pub outcome: Result<ShortenedUrl, AppError>,
}

/// Service for creating and resolving short URLs.
///
/// The write path validates, allocates a code, persists, registers the code in
/// the existence filter and warms the cache. The read path consults the filter,
/// then the cache, then the durable store, and emits a click event on success.
///
/// The durable store is authoritative. Cache and filter are accelerators and
/// are never consulted to decide that a code is free.
#[derive(Clone)]
pub struct ShortenerService {
    repository: Arc<dyn UrlRepository>,
    cache: UrlCache,
    filter: Arc<ExistenceFilter>,
    clicks: mpsc::Sender<ClickEvent>,
    settings: ShortenerSettings,
}

impl ShortenerService {
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: UrlCache,
        filter: Arc<ExistenceFilter>,
        clicks: mpsc::Sender<ClickEvent>,
        settings: ShortenerSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            filter,
            clicks,
            settings,
        }
    }

    /// Creates a short URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is not an absolute http(s)
    /// URL, the alias is malformed or reserved, or `expires_in` overflows.
    ///
    /// Returns [`AppError::Conflict`] if the alias is taken, including when a
    /// concurrent writer claims it between the check and the insert.
    ///
    /// Returns [`AppError::Generation`] when no free code is found within the
    /// attempt budget.
    ///
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn shorten(&self, request: ShortenRequest) -> Result<ShortenedUrl, AppError> {
        validate_url(&request.url)?;

        let alias = request.alias.filter(|a| !a.is_empty());
        if let Some(alias) = &alias {
            validate_alias(alias)?;
        }

        let now = Utc::now();
        let expires_at = request
            .expires_in
            .map(|secs| expiry_from(now, secs))
            .transpose()?;

        let short_code = match alias {
            Some(alias) => {
                if self.repository.exists_by_code(&alias).await? {
                    return Err(AppError::conflict(
                        "Alias already exists",
                        json!({ "alias": alias }),
                    ));
                }
                alias
            }
            None => self.generate_unique_code().await?,
        };

        let created = self
            .repository
            .create(NewShortUrl {
                short_code,
                original_url: request.url,
                expires_at,
            })
            .await?;

        self.filter.add(&created.short_code);
        self.cache
            .populate(
                &created.short_code,
                &created.original_url,
                created.expires_at,
                Utc::now(),
            )
            .await;

        debug!("Created short URL {}", created.short_code);

        Ok(ShortenedUrl {
            short_url: self.short_url(&created.short_code),
            short_code: created.short_code,
            expires_at: created.expires_at,
        })
    }

    /// Shortens each item independently.
    ///
    /// Item failures are captured in the corresponding [`BatchResult`]; the
    /// call itself fails only on a malformed item list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `items` is empty or holds more than
    /// [`MAX_BATCH_SIZE`] entries.
    pub async fn shorten_batch(
        &self,
        items: Vec<ShortenRequest>,
    ) -> Result<Vec<BatchResult>, AppError> {
        if items.is_empty() || items.len() > MAX_BATCH_SIZE {
            return Err(AppError::bad_request(
                format!("Batch must contain 1-{} items", MAX_BATCH_SIZE),
                json!({ "provided": items.len(), "max": MAX_BATCH_SIZE }),
            ));
        }

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let url = item.url.clone();
            let outcome = self.shorten(item).await;
            results.push(BatchResult { url, outcome });
        }

        Ok(results)
    }

    /// Resolves a short code to its original URL.
    ///
    /// A cache hit is returned without re-checking expiration: the cache TTL
    /// never outlives the mapping. When `click` is provided, a click event is
    /// queued without waiting for it to be persisted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code was never issued.
    /// Returns [`AppError::Gone`] if the mapping has expired.
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn get_original_url(
        &self,
        short_code: &str,
        click: Option<ClickInfo>,
    ) -> Result<String, AppError> {
        let started = Instant::now();

        if !self.filter.test(short_code) {
            metrics::counter!(EXISTENCE_FILTER_REJECTIONS_TOTAL).increment(1);
            return Err(not_found(short_code));
        }

        if let Some(url) = self.cache.get_url(short_code).await {
            self.emit_click(short_code, click);
            metrics::histogram!(REDIRECT_LATENCY_SECONDS, "cache_hit" => "true")
                .record(started.elapsed().as_secs_f64());
            return Ok(url);
        }

        let record = self
            .repository
            .find_by_code(short_code)
            .await?
            .ok_or_else(|| not_found(short_code))?;

        let now = Utc::now();
        if record.is_expired_at(now) {
            return Err(AppError::gone(
                "Short URL has expired",
                json!({ "code": short_code, "expired_at": record.expires_at }),
            ));
        }

        self.cache
            .populate(short_code, &record.original_url, record.expires_at, now)
            .await;
        self.emit_click(short_code, click);
        metrics::histogram!(REDIRECT_LATENCY_SECONDS, "cache_hit" => "false")
            .record(started.elapsed().as_secs_f64());

        Ok(record.original_url)
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, short_code: &str) -> String {
        format!(
            "{}/{}",
            self.settings.domain.trim_end_matches('/'),
            short_code
        )
    }

    async fn generate_unique_code(&self) -> Result<String, AppError> {
        for _ in 0..self.settings.max_attempts {
            let code = generate_code(self.settings.code_length);

            if !self.repository.exists_by_code(&code).await? {
                return Ok(code);
            }
            debug!("Generated code {} already taken, retrying", code);
        }

        Err(AppError::generation_failed(
            "Failed to generate a unique short code",
            json!({ "attempts": self.settings.max_attempts }),
        ))
    }

    fn emit_click(&self, short_code: &str, click: Option<ClickInfo>) {
        let Some(info) = click else {
            return;
        };

        match self.clicks.try_send(ClickEvent::new(short_code, info)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                metrics::counter!(CLICK_EVENTS_DROPPED_TOTAL).increment(1);
                warn!("Click queue full, dropping event for {}", short_code);
            }
            Err(TrySendError::Closed(_)) => {
                metrics::counter!(CLICK_EVENTS_DROPPED_TOTAL).increment(1);
                warn!("Click queue closed, dropping event for {}", short_code);
            }
        }
    }
}

fn expiry_from(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, AppError> {
    TimeDelta::try_seconds(expires_in)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| {
            AppError::bad_request(
                "expires_in is out of range",
                json!({ "expires_in": expires_in }),
            )
        })
}

fn not_found(short_code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "code": short_code }))
}
