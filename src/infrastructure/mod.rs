//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and caching.
//!
//! # Modules
//!
//! - [`cache`] - Key-value stores (Redis and in-process) and the URL cache
//! - [`existence_filter`] - Bloom filter over issued short codes
//! - [`metrics`] - Prometheus recorder and metric names
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod existence_filter;
pub mod metrics;
pub mod persistence;
