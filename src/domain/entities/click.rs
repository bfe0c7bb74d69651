//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};

/// A click recorded when a short code is resolved.
///
/// All client metadata is optional; headers may be missing or the client
/// address unknown.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Click {
    pub id: i64,
    pub short_code: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

/// Aggregated click figures for one short code.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct ClickStats {
    pub total_clicks: i64,
    /// Distinct non-null client addresses.
    pub unique_ips: i64,
    pub last_click: Option<DateTime<Utc>>,
}

/// Input data for recording a click.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub short_code: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}
