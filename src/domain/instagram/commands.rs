use uuid::Uuid;

use super::value_objects::MediaSnapshot;

#[derive(Debug, Clone)]
pub enum InstagramCommand {
    Import {
        post_id: Uuid,
        media: MediaSnapshot,
    },
    /// Re-sync a known post; curation flags are left alone
    Refresh {
        media: MediaSnapshot,
    },
    Curate {
        is_displayed: Option<bool>,
        display_order: Option<i32>,
    },
}
