//! Click event model for asynchronous click recording.

use chrono::{DateTime, Utc};

/// Client metadata captured at the transport edge for a redirect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl ClickInfo {
    pub fn new(ip: Option<String>, user_agent: Option<&str>, referer: Option<&str>) -> Self {
        Self {
            ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.map(|s| s.to_string()),
        }
    }
}

/// A redirect event handed from the request path to the background worker.
///
/// Emission is fire-and-forget: the request path never waits for the event to
/// be persisted, and a full queue drops the event.
///
/// # Usage Flow
///
/// 1. Created by [`crate::application::services::ShortenerService::get_original_url`]
/// 2. Sent to a bounded channel (non-blocking)
/// 3. Processed by [`crate::domain::click_worker::run_click_worker`]
/// 4. Converted to [`crate::domain::entities::NewClick`] for persistence
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub short_code: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates an event stamped with the current time.
    pub fn new(short_code: impl Into<String>, info: ClickInfo) -> Self {
        Self {
            short_code: short_code.into(),
            ip: info.ip,
            user_agent: info.user_agent,
            referer: info.referer,
            timestamp: Utc::now(),
        }
    }
}
