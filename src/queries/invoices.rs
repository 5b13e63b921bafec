use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::invoice::InvoiceAggregate;
use crate::error::Result;

use super::{fetch_documents, select_documents};

/// All invoices, or one brand's, newest first
pub async fn list(pool: &PgPool, brand: Option<Uuid>) -> Result<Vec<InvoiceAggregate>> {
    let mut qb = select_documents::<InvoiceAggregate>();
    if let Some(brand_id) = brand {
        qb.push(" AND body->>'brand_id' = ").push_bind(brand_id.to_string());
    }
    qb.push(" ORDER BY created_at DESC");
    fetch_documents(&mut qb, pool).await
}

pub async fn for_order(pool: &PgPool, order_id: Uuid) -> Result<Vec<InvoiceAggregate>> {
    let mut qb = select_documents::<InvoiceAggregate>();
    qb.push(" AND body->>'order_id' = ")
        .push_bind(order_id.to_string())
        .push(" ORDER BY body->>'brand_name'");
    fetch_documents(&mut qb, pool).await
}
