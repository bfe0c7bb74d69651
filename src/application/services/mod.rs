//! Business logic services for the application layer.

pub mod analytics_service;
pub mod rate_limiter;
pub mod shortener_service;

pub use analytics_service::{AnalyticsService, CodeAnalytics};
pub use rate_limiter::{RateLimitError, RateLimiter};
pub use shortener_service::{
    BatchResult, MAX_BATCH_SIZE, ShortenRequest, ShortenedUrl, ShortenerService,
    ShortenerSettings,
};
