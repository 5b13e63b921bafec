use sqlx::PgPool;

use crate::domain::interest::{InterestAggregate, InterestStatus};
use crate::error::Result;

use super::{fetch_documents, select_documents};

pub async fn list(pool: &PgPool, status: Option<InterestStatus>) -> Result<Vec<InterestAggregate>> {
    let mut qb = select_documents::<InterestAggregate>();
    if let Some(status) = status {
        qb.push(" AND body->>'status' = ").push_bind(status.as_str());
    }
    qb.push(" ORDER BY created_at DESC");
    fetch_documents(&mut qb, pool).await
}
