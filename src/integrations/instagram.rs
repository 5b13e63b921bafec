// Instagram Graph API integration
// Fetches the account's recent media for the curated storefront feed

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::InstagramConfig;
use crate::domain::instagram::{MediaSnapshot, MediaSource};
use crate::error::AppError;

const MEDIA_FIELDS: &str = "id,caption,media_type,media_url,thumbnail_url,permalink,timestamp";

/// Graph API timestamps look like `2024-01-15T10:30:00+0000`
const GRAPH_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

#[derive(Debug, Deserialize)]
struct MediaPage {
    #[serde(default)]
    data: Vec<GraphMedia>,
}

#[derive(Debug, Deserialize)]
struct GraphMedia {
    id: String,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    media_url: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
    timestamp: String,
}

impl GraphMedia {
    fn into_snapshot(self) -> Option<MediaSnapshot> {
        let posted_at = match DateTime::parse_from_str(&self.timestamp, GRAPH_TIME_FORMAT) {
            Ok(at) => at.with_timezone(&Utc),
            Err(e) => {
                warn!(media_id = %self.id, timestamp = %self.timestamp, error = %e, "Skipping media with bad timestamp");
                return None;
            }
        };

        let media_type = self.media_type.unwrap_or_else(|| "IMAGE".to_string());
        // Videos expose a playable url; the feed shows their thumbnail
        let media_url = match media_type.as_str() {
            "VIDEO" => self.thumbnail_url.or(self.media_url),
            _ => self.media_url.or(self.thumbnail_url),
        }
        .unwrap_or_default();

        Some(MediaSnapshot {
            media_id: self.id,
            caption: self.caption.unwrap_or_default(),
            media_type,
            media_url,
            permalink: self.permalink.unwrap_or_default(),
            posted_at,
        })
    }
}

pub struct InstagramGraphClient {
    client: Client,
    config: InstagramConfig,
}

impl InstagramGraphClient {
    pub fn new(config: InstagramConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self { client, config })
    }

    fn parse_page(page: MediaPage) -> Vec<MediaSnapshot> {
        page.data.into_iter().filter_map(GraphMedia::into_snapshot).collect()
    }
}

#[async_trait]
impl MediaSource for InstagramGraphClient {
    async fn recent_media(&self) -> Result<Vec<MediaSnapshot>, AppError> {
        if self.config.access_token.is_empty() {
            return Err(AppError::BadRequest(
                "Instagram access token is not configured".to_string(),
            ));
        }

        let url = format!("{}/me/media", self.config.graph_url.trim_end_matches('/'));
        let limit = self.config.fetch_limit.to_string();
        debug!(url = %url, limit = %limit, "Fetching Instagram media");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("fields", MEDIA_FIELDS),
                ("limit", limit.as_str()),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Instagram API error {}: {}", status, text)));
        }

        let page: MediaPage = response.json().await?;
        let media = Self::parse_page(page);

        info!(count = media.len(), "Fetched Instagram media");
        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn page(json: serde_json::Value) -> Vec<MediaSnapshot> {
        InstagramGraphClient::parse_page(serde_json::from_value(json).unwrap())
    }

    #[test]
    fn test_parses_graph_media() {
        let media = page(serde_json::json!({
            "data": [{
                "id": "17895695668004550",
                "caption": "New season drop",
                "media_type": "IMAGE",
                "media_url": "https://cdn.example.com/a.jpg",
                "permalink": "https://www.instagram.com/p/abc/",
                "timestamp": "2024-01-15T10:30:00+0000"
            }],
            "paging": { "cursors": { "before": "x", "after": "y" } }
        }));

        assert_eq!(media.len(), 1);
        assert_eq!(media[0].media_id, "17895695668004550");
        assert_eq!(media[0].caption, "New season drop");
        assert_eq!(media[0].posted_at, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_video_uses_thumbnail() {
        let media = page(serde_json::json!({
            "data": [{
                "id": "1",
                "media_type": "VIDEO",
                "media_url": "https://cdn.example.com/v.mp4",
                "thumbnail_url": "https://cdn.example.com/v.jpg",
                "timestamp": "2024-02-01T08:00:00+0100"
            }]
        }));

        assert_eq!(media[0].media_url, "https://cdn.example.com/v.jpg");
        assert_eq!(media[0].caption, "");
        assert_eq!(media[0].posted_at, Utc.with_ymd_and_hms(2024, 2, 1, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_bad_timestamp_is_skipped() {
        let media = page(serde_json::json!({
            "data": [
                { "id": "1", "timestamp": "yesterday" },
                { "id": "2", "timestamp": "2024-03-01T00:00:00+0000" }
            ]
        }));

        assert_eq!(media.len(), 1);
        assert_eq!(media[0].media_id, "2");
        assert_eq!(media[0].media_type, "IMAGE");
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let client = InstagramGraphClient::new(InstagramConfig::default()).unwrap();
        assert!(matches!(client.recent_media().await, Err(AppError::BadRequest(_))));
    }
}
