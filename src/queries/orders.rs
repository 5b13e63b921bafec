use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::order::OrderAggregate;
use crate::domain::product::ProductAggregate;
use crate::domain::user::UserAggregate;
use crate::error::Result;
use crate::persistence::Document;

use super::{fetch_documents, select_documents};

const CONTAINS_BRAND: &str =
    " AND EXISTS (SELECT 1 FROM jsonb_array_elements(body->'brand_deliveries') d WHERE d->>'brand_id' = ";

pub async fn mine(pool: &PgPool, user_id: Uuid) -> Result<Vec<OrderAggregate>> {
    let mut qb = select_documents::<OrderAggregate>();
    qb.push(" AND body->>'user_id' = ")
        .push_bind(user_id.to_string())
        .push(" ORDER BY created_at DESC");
    fetch_documents(&mut qb, pool).await
}

/// Every order, or only those with items from `brand`
pub async fn list(pool: &PgPool, brand: Option<Uuid>) -> Result<Vec<OrderAggregate>> {
    let mut qb = select_documents::<OrderAggregate>();
    if let Some(brand_id) = brand {
        qb.push(CONTAINS_BRAND).push_bind(brand_id.to_string()).push(")");
    }
    qb.push(" ORDER BY created_at DESC");
    fetch_documents(&mut qb, pool).await
}

/// Orders containing the brand's items, trimmed to what the brand may see
pub async fn for_brand(pool: &PgPool, brand_id: Uuid) -> Result<Vec<OrderAggregate>> {
    let orders = list(pool, Some(brand_id)).await?;
    Ok(orders.iter().map(|o| o.view_for_brand(brand_id)).collect())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DailyOrders {
    pub date: String,
    pub orders: i64,
    pub sales: Decimal,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminSummary {
    pub users: i64,
    pub orders: i64,
    pub total_sales: Decimal,
    pub daily_orders: Vec<DailyOrders>,
    pub product_categories: Vec<CategoryCount>,
}

pub async fn summary(pool: &PgPool) -> Result<AdminSummary> {
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM documents WHERE collection = $1")
        .bind(UserAggregate::COLLECTION)
        .fetch_one(pool)
        .await?;

    let totals = sqlx::query(
        "SELECT COUNT(*)::BIGINT AS orders,
                COALESCE(SUM((body->>'total_price')::numeric), 0) AS sales
         FROM documents WHERE collection = $1",
    )
    .bind(OrderAggregate::COLLECTION)
    .fetch_one(pool)
    .await?;

    let daily = sqlx::query(
        "SELECT to_char(created_at, 'YYYY-MM-DD') AS date,
                COUNT(*)::BIGINT AS orders,
                COALESCE(SUM((body->>'total_price')::numeric), 0) AS sales
         FROM documents WHERE collection = $1
         GROUP BY date ORDER BY date",
    )
    .bind(OrderAggregate::COLLECTION)
    .fetch_all(pool)
    .await?;

    let categories = sqlx::query(
        "SELECT body->>'category' AS category, COUNT(*)::BIGINT AS count
         FROM documents WHERE collection = $1
         GROUP BY category ORDER BY category",
    )
    .bind(ProductAggregate::COLLECTION)
    .fetch_all(pool)
    .await?;

    Ok(AdminSummary {
        users,
        orders: totals.try_get("orders")?,
        total_sales: totals.try_get("sales")?,
        daily_orders: daily
            .iter()
            .map(|row| {
                Ok(DailyOrders {
                    date: row.try_get("date")?,
                    orders: row.try_get("orders")?,
                    sales: row.try_get("sales")?,
                })
            })
            .collect::<std::result::Result<_, sqlx::Error>>()?,
        product_categories: categories
            .iter()
            .map(|row| {
                Ok(CategoryCount {
                    category: row.try_get::<Option<String>, _>("category")?.unwrap_or_default(),
                    count: row.try_get("count")?,
                })
            })
            .collect::<std::result::Result<_, sqlx::Error>>()?,
    })
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BrandSummary {
    pub orders: i64,
    /// Item subtotal of this brand's share in paid orders
    pub sales: Decimal,
    pub products: i64,
    pub pending_deliveries: i64,
}

pub async fn brand_summary(pool: &PgPool, brand_id: Uuid) -> Result<BrandSummary> {
    let row = sqlx::query(
        "SELECT COUNT(*)::BIGINT AS orders,
                COALESCE(SUM((d->>'items_price')::numeric)
                    FILTER (WHERE (o.body->>'is_paid')::boolean), 0) AS sales,
                COUNT(*) FILTER (
                    WHERE (o.body->>'is_paid')::boolean AND d->>'status' = 'Pending'
                )::BIGINT AS pending_deliveries
         FROM documents o
         CROSS JOIN LATERAL jsonb_array_elements(o.body->'brand_deliveries') d
         WHERE o.collection = $1 AND d->>'brand_id' = $2",
    )
    .bind(OrderAggregate::COLLECTION)
    .bind(brand_id.to_string())
    .fetch_one(pool)
    .await?;

    let products: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)::BIGINT FROM documents WHERE collection = $1 AND body->>'brand_id' = $2",
    )
    .bind(ProductAggregate::COLLECTION)
    .bind(brand_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(BrandSummary {
        orders: row.try_get("orders")?,
        sales: row.try_get("sales")?,
        products,
        pending_deliveries: row.try_get("pending_deliveries")?,
    })
}
