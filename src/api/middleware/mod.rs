//! HTTP middleware for request processing and protection.
//!
//! Provides rate limiting, request counting and request tracing.

pub mod metrics;
pub mod rate_limit;
pub mod tracing;
