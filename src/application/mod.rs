//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! the cache, the existence filter and validation. Handlers talk to services
//! only.
//!
//! # Available Services
//!
//! - [`services::ShortenerService`] - Short URL creation and resolution
//! - [`services::AnalyticsService`] - Click statistics per short code
//! - [`services::RateLimiter`] - Sliding-window admission control

pub mod services;
