use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::product::ProductAggregate;
use crate::error::Result;
use crate::persistence::Document;

use super::{active_filter, fetch_documents, select_documents};

pub const DEFAULT_PAGE_SIZE: i64 = 12;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Newest,
    Lowest,
    Highest,
    TopRated,
}

impl SortOrder {
    /// Unknown values fall back to newest first
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("lowest") => SortOrder::Lowest,
            Some("highest") => SortOrder::Highest,
            Some("toprated") => SortOrder::TopRated,
            _ => SortOrder::Newest,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            SortOrder::Newest => " ORDER BY created_at DESC",
            SortOrder::Lowest => " ORDER BY (body->>'price')::numeric ASC, created_at DESC",
            SortOrder::Highest => " ORDER BY (body->>'price')::numeric DESC, created_at DESC",
            SortOrder::TopRated => " ORDER BY (body->>'rating')::float8 DESC, created_at DESC",
        }
    }
}

/// Query string of `GET /api/products/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSearch {
    pub name: Option<String>,
    pub category: Option<String>,
    /// Brand id or brand name
    pub brand: Option<String>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub rating: Option<f64>,
    pub order: Option<String>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize", alias = "page_size")]
    pub page_size: Option<i64>,
}

impl ProductSearch {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Rows to skip; saturates so huge page numbers yield an empty page
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.page_size())
    }

    fn push_filters(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(name) = active_filter(&self.name) {
            qb.push(" AND body->>'name' ILIKE ")
                .push_bind(contains_pattern(name))
                .push(" ESCAPE '\\'");
        }
        if let Some(category) = active_filter(&self.category) {
            qb.push(" AND body->>'category' = ").push_bind(category.to_string());
        }
        if let Some(brand) = active_filter(&self.brand) {
            match Uuid::parse_str(brand) {
                Ok(brand_id) => qb.push(" AND body->>'brand_id' = ").push_bind(brand_id.to_string()),
                Err(_) => qb.push(" AND body->>'brand_name' = ").push_bind(brand.to_string()),
            };
        }
        if let Some(min) = self.min {
            qb.push(" AND (body->>'price')::numeric >= ").push_bind(min);
        }
        if let Some(max) = self.max {
            qb.push(" AND (body->>'price')::numeric <= ").push_bind(max);
        }
        if let Some(rating) = self.rating.filter(|r| *r > 0.0) {
            qb.push(" AND (body->>'rating')::float8 >= ").push_bind(rating);
        }
    }
}

/// `%name%` with LIKE wildcards in the input matched literally
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductAggregate>,
    pub page: i64,
    pub pages: i64,
    pub total: i64,
}

pub fn page_count(total: i64, page_size: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total + page_size - 1) / page_size
    }
}

pub async fn search(pool: &PgPool, search: &ProductSearch) -> Result<ProductPage> {
    let page = search.page();
    let page_size = search.page_size();

    let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)::BIGINT AS total FROM documents WHERE collection = ");
    count_qb.push_bind(ProductAggregate::COLLECTION);
    search.push_filters(&mut count_qb);
    let total: i64 = count_qb.build().fetch_one(pool).await?.try_get("total")?;

    let mut qb = select_documents::<ProductAggregate>();
    search.push_filters(&mut qb);
    qb.push(SortOrder::parse(search.order.as_deref()).order_by())
        .push(" LIMIT ")
        .push_bind(page_size)
        .push(" OFFSET ")
        .push_bind(search.offset());

    let products = fetch_documents(&mut qb, pool).await?;

    Ok(ProductPage {
        products,
        page,
        pages: page_count(total, page_size),
        total,
    })
}

/// Distinct categories, sorted
pub async fn categories(pool: &PgPool) -> Result<Vec<String>> {
    let categories = sqlx::query_scalar(
        "SELECT DISTINCT body->>'category' AS category
         FROM documents
         WHERE collection = $1 AND body->>'category' IS NOT NULL
         ORDER BY category",
    )
    .bind(ProductAggregate::COLLECTION)
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// A brand's own catalog, newest first
pub async fn for_brand(pool: &PgPool, brand_id: Uuid) -> Result<Vec<ProductAggregate>> {
    let mut qb = select_documents::<ProductAggregate>();
    qb.push(" AND body->>'brand_id' = ")
        .push_bind(brand_id.to_string())
        .push(" ORDER BY created_at DESC");
    fetch_documents(&mut qb, pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse(None), SortOrder::Newest);
        assert_eq!(SortOrder::parse(Some("lowest")), SortOrder::Lowest);
        assert_eq!(SortOrder::parse(Some("highest")), SortOrder::Highest);
        assert_eq!(SortOrder::parse(Some("toprated")), SortOrder::TopRated);
        assert_eq!(SortOrder::parse(Some("TopRated")), SortOrder::TopRated);
        assert_eq!(SortOrder::parse(Some("bogus")), SortOrder::Newest);
    }

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page_count(0, 12), 0);
        assert_eq!(page_count(1, 12), 1);
        assert_eq!(page_count(12, 12), 1);
        assert_eq!(page_count(13, 12), 2);
    }

    #[test]
    fn test_paging_defaults_and_bounds() {
        let search = ProductSearch::default();
        assert_eq!(search.page(), 1);
        assert_eq!(search.page_size(), DEFAULT_PAGE_SIZE);

        let search = ProductSearch {
            page: Some(0),
            page_size: Some(10_000),
            ..ProductSearch::default()
        };
        assert_eq!(search.page(), 1);
        assert_eq!(search.page_size(), 100);
        assert_eq!(search.offset(), 0);

        let search = ProductSearch {
            page: Some(3),
            ..ProductSearch::default()
        };
        assert_eq!(search.offset(), 24);

        let search = ProductSearch {
            page: Some(i64::MAX),
            ..ProductSearch::default()
        };
        assert_eq!(search.offset(), i64::MAX);
    }

    #[test]
    fn test_name_wildcards_are_literal() {
        assert_eq!(contains_pattern("shirt"), "%shirt%");
        assert_eq!(contains_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");

        let search = ProductSearch {
            name: Some("50%".to_string()),
            ..ProductSearch::default()
        };
        let mut qb = select_documents::<ProductAggregate>();
        search.push_filters(&mut qb);
        assert!(qb.sql().contains(r"ILIKE $2 ESCAPE '\'"));
    }

    #[test]
    fn test_filters_render_sql() {
        let search = ProductSearch {
            name: Some("shirt".to_string()),
            category: Some("all".to_string()),
            brand: Some("Linnen Co".to_string()),
            min: Some(dec!(10)),
            max: Some(dec!(50)),
            rating: Some(4.0),
            ..ProductSearch::default()
        };

        let mut qb = select_documents::<ProductAggregate>();
        search.push_filters(&mut qb);
        let sql = qb.sql();

        assert!(sql.contains("body->>'name' ILIKE"));
        assert!(!sql.contains("body->>'category'"));
        assert!(sql.contains("body->>'brand_name' ="));
        assert!(sql.contains("(body->>'price')::numeric >="));
        assert!(sql.contains("(body->>'price')::numeric <="));
        assert!(sql.contains("(body->>'rating')::float8 >="));
    }

    #[test]
    fn test_brand_filter_by_id() {
        let search = ProductSearch {
            brand: Some(Uuid::new_v4().to_string()),
            ..ProductSearch::default()
        };
        let mut qb = select_documents::<ProductAggregate>();
        search.push_filters(&mut qb);
        assert!(qb.sql().contains("body->>'brand_id' ="));
    }
}
