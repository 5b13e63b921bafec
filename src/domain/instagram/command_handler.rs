use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::persistence::{CommandContext, CommandHandler, DocumentStore};

use super::aggregate::InstagramPostAggregate;
use super::commands::InstagramCommand;
use super::value_objects::MediaSnapshot;

// ============================================================================
// Instagram Feed Sync
// ============================================================================

/// Where recent posts come from
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn recent_media(&self) -> Result<Vec<MediaSnapshot>, AppError>;
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub fetched: usize,
    pub imported: usize,
    pub refreshed: usize,
    pub unchanged: usize,
}

/// Command for one fetched post given what is already stored under its media id
pub fn sync_command(existing: Option<&InstagramPostAggregate>, media: MediaSnapshot) -> InstagramCommand {
    match existing {
        Some(_) => InstagramCommand::Refresh { media },
        None => InstagramCommand::Import {
            post_id: Uuid::now_v7(),
            media,
        },
    }
}

#[derive(Clone)]
pub struct InstagramSyncHandler {
    pool: PgPool,
    posts: CommandHandler<InstagramPostAggregate>,
    source: Arc<dyn MediaSource>,
}

impl InstagramSyncHandler {
    pub fn new(pool: PgPool, source: Arc<dyn MediaSource>) -> Self {
        Self {
            posts: CommandHandler::new(DocumentStore::new(pool.clone())),
            pool,
            source,
        }
    }

    pub fn posts(&self) -> &CommandHandler<InstagramPostAggregate> {
        &self.posts
    }

    /// Upsert recent media by media id in a single transaction
    pub async fn sync(&self, ctx: CommandContext) -> Result<SyncReport, AppError> {
        let media = self.source.recent_media().await?;
        let mut report = SyncReport {
            fetched: media.len(),
            ..SyncReport::default()
        };

        let mut tx = self.pool.begin().await?;

        for snapshot in media {
            let existing = self
                .posts
                .store()
                .find_by_field_in(&mut tx, "media_id", &snapshot.media_id)
                .await?;

            match existing {
                Some(post) => {
                    let before = post.version;
                    let command = sync_command(Some(&post), snapshot);
                    let post = self.posts.execute_loaded_in(&mut tx, post, command, ctx).await?;
                    if post.version == before {
                        report.unchanged += 1;
                    } else {
                        report.refreshed += 1;
                    }
                }
                None => {
                    self.posts.create_in(&mut tx, sync_command(None, snapshot), ctx).await?;
                    report.imported += 1;
                }
            }
        }

        tx.commit().await?;

        tracing::info!(
            fetched = report.fetched,
            imported = report.imported,
            refreshed = report.refreshed,
            unchanged = report.unchanged,
            "Instagram feed synced"
        );

        Ok(report)
    }
}
