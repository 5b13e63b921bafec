// ============================================================================
// Read Side - queries straight over the document table
// ============================================================================
//
// Commands go through aggregates and the document store; everything that
// only reads (search, listings, dashboards) is answered here with SQL over
// the JSONB bodies.
//
// ============================================================================

pub mod instagram;
pub mod interests;
pub mod invoices;
pub mod orders;
pub mod products;
pub mod users;

use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};

use crate::error::Result;
use crate::persistence::{decode_row, Document};

/// Start a `SELECT version, body` over one collection; callers append
/// ` AND ...` filters and ordering
pub(crate) fn select_documents<'a, A: Document>() -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT version, body FROM documents WHERE collection = ");
    qb.push_bind(A::COLLECTION);
    qb
}

pub(crate) async fn fetch_documents<A: Document>(qb: &mut QueryBuilder<'_, Postgres>, pool: &PgPool) -> Result<Vec<A>> {
    let rows = qb.build().fetch_all(pool).await?;
    decode_rows(rows)
}

fn decode_rows<A: Document>(rows: Vec<PgRow>) -> Result<Vec<A>> {
    rows.into_iter()
        .map(|row| Ok(decode_row::<A>(row.try_get("version")?, row.try_get("body")?)?))
        .collect()
}

/// Storefront filters use `all` (or nothing) for "no filter"
pub(crate) fn active_filter(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_filter() {
        assert_eq!(active_filter(&None), None);
        assert_eq!(active_filter(&Some("".to_string())), None);
        assert_eq!(active_filter(&Some("all".to_string())), None);
        assert_eq!(active_filter(&Some("ALL".to_string())), None);
        assert_eq!(active_filter(&Some(" Shirts ".to_string())), Some("Shirts"));
    }
}
