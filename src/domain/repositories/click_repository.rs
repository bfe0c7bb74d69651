//! Repository trait for click persistence.

use crate::domain::entities::{Click, ClickStats, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage for redirect events.
///
/// Writes come only from the background click worker, never from the
/// redirect path. Reads back the analytics endpoint and the admin CLI.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Records a single click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Counts recorded clicks, optionally for a single code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self, short_code: Option<String>) -> Result<i64, AppError>;

    /// Totals, distinct client addresses and latest click time for a code.
    ///
    /// A code without clicks yields zeroed stats.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn stats(&self, short_code: &str) -> Result<ClickStats, AppError>;

    /// Most recent clicks for a code, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn recent(&self, short_code: &str, limit: i64) -> Result<Vec<Click>, AppError>;
}
