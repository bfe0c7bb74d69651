//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx with bound
//! parameters.
//!
//! # Repositories
//!
//! - [`PgUrlRepository`] - Short URL storage and lookup
//! - [`PgClickRepository`] - Click recording

pub mod pg_click_repository;
pub mod pg_url_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_url_repository::PgUrlRepository;
