use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::core::Aggregate;
use crate::persistence::store::Document;
use super::commands::InstagramCommand;
use super::errors::InstagramError;
use super::events::*;

// ============================================================================
// Instagram Post Aggregate - a synced post plus its curation flags
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramPostAggregate {
    pub id: Uuid,
    #[serde(default)]
    pub version: i64,
    pub media_id: String,
    pub caption: String,
    pub media_type: String,
    pub media_url: String,
    pub permalink: String,
    pub posted_at: DateTime<Utc>,
    pub is_displayed: bool,
    pub display_order: i32,
    pub synced_at: DateTime<Utc>,
}

impl Aggregate for InstagramPostAggregate {
    type Event = InstagramEvent;
    type Command = InstagramCommand;
    type Error = InstagramError;

    fn handle_create(command: &Self::Command) -> Result<Self::Event, Self::Error> {
        match command {
            InstagramCommand::Import { post_id, media } => {
                if media.media_id.trim().is_empty() {
                    return Err(InstagramError::MissingMediaId);
                }
                Ok(InstagramEvent::Imported(PostImported {
                    post_id: *post_id,
                    media: media.clone(),
                    synced_at: Utc::now(),
                }))
            }
            _ => Err(InstagramError::NotInitialized),
        }
    }

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            // new posts stay hidden until curated
            InstagramEvent::Imported(e) => Ok(Self {
                id: e.post_id,
                version: 0,
                media_id: e.media.media_id.clone(),
                caption: e.media.caption.clone(),
                media_type: e.media.media_type.clone(),
                media_url: e.media.media_url.clone(),
                permalink: e.media.permalink.clone(),
                posted_at: e.media.posted_at,
                is_displayed: false,
                display_order: 0,
                synced_at: e.synced_at,
            }),
            _ => Err(InstagramError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            InstagramEvent::Imported(_) => {}
            InstagramEvent::Refreshed(e) => {
                self.caption = e.media.caption.clone();
                self.media_type = e.media.media_type.clone();
                self.media_url = e.media.media_url.clone();
                self.permalink = e.media.permalink.clone();
                self.posted_at = e.media.posted_at;
                self.synced_at = e.synced_at;
            }
            InstagramEvent::Curated(e) => {
                self.is_displayed = e.is_displayed;
                self.display_order = e.display_order;
            }
        }
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InstagramCommand::Import { .. } => Err(InstagramError::NotInitialized),

            InstagramCommand::Refresh { media } => {
                if media.media_id != self.media_id {
                    return Err(InstagramError::MediaMismatch {
                        expected: self.media_id.clone(),
                        got: media.media_id.clone(),
                    });
                }

                let unchanged = media.caption == self.caption
                    && media.media_type == self.media_type
                    && media.media_url == self.media_url
                    && media.permalink == self.permalink
                    && media.posted_at == self.posted_at;
                if unchanged {
                    return Ok(vec![]);
                }

                Ok(vec![InstagramEvent::Refreshed(PostRefreshed {
                    media: media.clone(),
                    synced_at: Utc::now(),
                })])
            }

            InstagramCommand::Curate { is_displayed, display_order } => {
                let display_order = display_order.unwrap_or(self.display_order);
                if display_order < 0 {
                    return Err(InstagramError::NegativeDisplayOrder);
                }
                Ok(vec![InstagramEvent::Curated(PostCurated {
                    is_displayed: is_displayed.unwrap_or(self.is_displayed),
                    display_order,
                })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

impl Document for InstagramPostAggregate {
    const COLLECTION: &'static str = "instagram_posts";
    const AGGREGATE_TYPE: &'static str = "InstagramPost";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instagram::MediaSnapshot;
    use chrono::TimeZone;

    fn media(id: &str, caption: &str) -> MediaSnapshot {
        MediaSnapshot {
            media_id: id.to_string(),
            caption: caption.to_string(),
            media_type: "IMAGE".to_string(),
            media_url: format!("https://cdn.example.com/{}.jpg", id),
            permalink: format!("https://instagram.com/p/{}", id),
            posted_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn import(id: &str) -> InstagramPostAggregate {
        let command = InstagramCommand::Import {
            post_id: Uuid::new_v4(),
            media: media(id, "Spring drop"),
        };
        InstagramPostAggregate::create(&command).unwrap().0
    }

    #[test]
    fn test_imported_posts_are_hidden() {
        let post = import("17890");
        assert!(!post.is_displayed);
        assert_eq!(post.display_order, 0);
        assert_eq!(post.media_id, "17890");
    }

    #[test]
    fn test_import_requires_media_id() {
        let command = InstagramCommand::Import {
            post_id: Uuid::new_v4(),
            media: media("", "x"),
        };
        assert!(matches!(
            InstagramPostAggregate::create(&command),
            Err(InstagramError::MissingMediaId)
        ));
    }

    #[test]
    fn test_refresh_unchanged_is_noop() {
        let post = import("17890");
        let events = post
            .handle_command(&InstagramCommand::Refresh { media: media("17890", "Spring drop") })
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_refresh_keeps_curation() {
        let mut post = import("17890");
        post.execute(&InstagramCommand::Curate { is_displayed: Some(true), display_order: Some(3) })
            .unwrap();

        post.execute(&InstagramCommand::Refresh { media: media("17890", "Spring drop, restocked") })
            .unwrap();

        assert_eq!(post.caption, "Spring drop, restocked");
        assert!(post.is_displayed);
        assert_eq!(post.display_order, 3);
    }

    #[test]
    fn test_refresh_other_media_fails() {
        let post = import("17890");
        let result = post.handle_command(&InstagramCommand::Refresh { media: media("999", "x") });
        assert!(matches!(result, Err(InstagramError::MediaMismatch { .. })));
    }

    #[test]
    fn test_curate_partial_update() {
        let mut post = import("17890");
        post.execute(&InstagramCommand::Curate { is_displayed: None, display_order: Some(2) })
            .unwrap();
        assert!(!post.is_displayed);
        assert_eq!(post.display_order, 2);

        let result = post.handle_command(&InstagramCommand::Curate { is_displayed: None, display_order: Some(-1) });
        assert!(matches!(result, Err(InstagramError::NegativeDisplayOrder)));
    }
}
