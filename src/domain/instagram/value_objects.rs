use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post as the Graph API currently reports it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MediaSnapshot {
    pub media_id: String,
    pub caption: String,
    pub media_type: String,
    pub media_url: String,
    pub permalink: String,
    pub posted_at: DateTime<Utc>,
}
