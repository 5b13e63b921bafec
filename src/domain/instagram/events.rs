use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::core::DomainEvent;
use super::value_objects::MediaSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InstagramEvent {
    Imported(PostImported),
    Refreshed(PostRefreshed),
    Curated(PostCurated),
}

impl DomainEvent for InstagramEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InstagramEvent::Imported(_) => "InstagramPostImported",
            InstagramEvent::Refreshed(_) => "InstagramPostRefreshed",
            InstagramEvent::Curated(_) => "InstagramPostCurated",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostImported {
    pub post_id: Uuid,
    pub media: MediaSnapshot,
    pub synced_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostRefreshed {
    pub media: MediaSnapshot,
    pub synced_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostCurated {
    pub is_displayed: bool,
    pub display_order: i32,
}
