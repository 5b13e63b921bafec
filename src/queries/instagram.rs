use sqlx::PgPool;

use crate::domain::instagram::InstagramPostAggregate;
use crate::error::Result;

use super::{fetch_documents, select_documents};

/// Displayed posts by curated position, then newest
pub async fn feed(pool: &PgPool) -> Result<Vec<InstagramPostAggregate>> {
    let mut qb = select_documents::<InstagramPostAggregate>();
    qb.push(
        " AND (body->>'is_displayed')::boolean
          ORDER BY (body->>'display_order')::int ASC, (body->>'posted_at')::timestamptz DESC",
    );
    fetch_documents(&mut qb, pool).await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<InstagramPostAggregate>> {
    let mut qb = select_documents::<InstagramPostAggregate>();
    qb.push(" ORDER BY (body->>'posted_at')::timestamptz DESC");
    fetch_documents(&mut qb, pool).await
}
