//! DTOs for the click analytics endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::CodeAnalytics;
use crate::domain::entities::Click;

/// Query string of `GET /analytics/{code}`.
///
/// `limit` stays raw text so a malformed value falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub short_code: String,
    pub total_clicks: i64,
    pub unique_ips: i64,
    pub last_click: Option<DateTime<Utc>>,
    pub records: Vec<ClickRecord>,
}

#[derive(Debug, Serialize)]
pub struct ClickRecord {
    pub id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

impl From<Click> for ClickRecord {
    fn from(click: Click) -> Self {
        Self {
            id: click.id,
            ip: click.ip,
            user_agent: click.user_agent,
            referer: click.referer,
            clicked_at: click.clicked_at,
        }
    }
}

impl From<CodeAnalytics> for AnalyticsResponse {
    fn from(analytics: CodeAnalytics) -> Self {
        Self {
            short_code: analytics.short_code,
            total_clicks: analytics.stats.total_clicks,
            unique_ips: analytics.stats.unique_ips,
            last_click: analytics.stats.last_click,
            records: analytics.records.into_iter().map(ClickRecord::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ClickStats;
    use serde_json::json;

    #[test]
    fn test_empty_analytics_serializes_zeroes() {
        let response = AnalyticsResponse::from(CodeAnalytics {
            short_code: "nope".to_string(),
            stats: ClickStats::default(),
            records: vec![],
        });

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "short_code": "nope",
                "total_clicks": 0,
                "unique_ips": 0,
                "last_click": null,
                "records": []
            })
        );
    }

    #[test]
    fn test_click_record_drops_short_code() {
        let record = ClickRecord::from(Click {
            id: 7,
            short_code: "abc".to_string(),
            ip: Some("10.0.0.1".to_string()),
            user_agent: Some("curl/8.0".to_string()),
            referer: None,
            clicked_at: Utc::now(),
        });

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["ip"], "10.0.0.1");
        assert!(value.get("short_code").is_none());
    }
}
