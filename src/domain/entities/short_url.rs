//! Short URL entity.

use chrono::{DateTime, Utc};

/// A persisted mapping from a short code to its original URL.
///
/// `short_code` is unique across the store for the lifetime of the record.
/// Records are never mutated after creation; an expired record stays in the
/// store and is reported as gone on resolution.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ShortUrl {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShortUrl {
    /// Returns true once `now` has passed the expiry time.
    ///
    /// A record expiring exactly at `now` is still considered live: the
    /// comparison is strict, so a mapping reads as expired from the first
    /// clock tick after `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Input data for creating a new short URL.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShortUrl {
    pub short_code: String,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}
