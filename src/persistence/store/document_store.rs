use serde::{de::DeserializeOwned, Serialize};
use sqlx::{PgConnection, PgPool, Row};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::persistence::core::{Aggregate, DomainEvent, EventEnvelope};

// ============================================================================
// Generic Document Store - Repository for Aggregates
// ============================================================================
//
// Responsibilities:
// 1. Persist the current aggregate state as a JSON document
// 2. Enforce optimistic concurrency on the document version
// 3. Append the emitted events to outbox_messages in the same transaction
//
// ============================================================================

/// An aggregate that lives in a named document collection
pub trait Document: Aggregate + Serialize + DeserializeOwned {
    const COLLECTION: &'static str;
    const AGGREGATE_TYPE: &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Concurrency conflict on {collection}/{id}: expected version {expected}")]
    Conflict {
        collection: &'static str,
        id: Uuid,
        expected: i64,
    },

    #[error("Duplicate value violates {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate(db_err.constraint().unwrap_or("unique index").to_string());
            }
        }
        StoreError::Database(err)
    }
}

pub struct DocumentStore<A: Document> {
    pool: PgPool,
    _phantom: PhantomData<A>,
}

impl<A: Document> Clone for DocumentStore<A> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<A: Document> DocumentStore<A> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: PhantomData,
        }
    }

    /// Load an aggregate by id; `None` when the document does not exist
    pub async fn load(&self, id: Uuid) -> Result<Option<A>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        self.load_in(&mut conn, id).await
    }

    pub async fn load_in(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<A>, StoreError> {
        let row = sqlx::query("SELECT version, body FROM documents WHERE collection = $1 AND id = $2")
            .bind(A::COLLECTION)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.map(|r| decode_row::<A>(r.get("version"), r.get("body")))
            .transpose()
    }

    /// Look a document up by a top-level text field of its body
    pub async fn find_by_field(&self, field: &str, value: &str) -> Result<Option<A>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        self.find_by_field_in(&mut conn, field, value).await
    }

    pub async fn find_by_field_in(
        &self,
        conn: &mut PgConnection,
        field: &str,
        value: &str,
    ) -> Result<Option<A>, StoreError> {
        let row = sqlx::query(
            "SELECT version, body FROM documents
             WHERE collection = $1 AND body->>$2 = $3
             LIMIT 1",
        )
        .bind(A::COLLECTION)
        .bind(field)
        .bind(value)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(|r| decode_row::<A>(r.get("version"), r.get("body")))
            .transpose()
    }

    /// Load every document in the collection, newest first
    pub async fn list(&self) -> Result<Vec<A>, StoreError> {
        let rows = sqlx::query(
            "SELECT version, body FROM documents WHERE collection = $1 ORDER BY created_at DESC",
        )
        .bind(A::COLLECTION)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| decode_row::<A>(r.get("version"), r.get("body")))
            .collect()
    }

    /// Persist the aggregate and its new events atomically.
    /// Returns the new version.
    pub async fn save(
        &self,
        aggregate: &mut A,
        expected_version: i64,
        events: Vec<EventEnvelope<A::Event>>,
    ) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let version = self.save_in(&mut tx, aggregate, expected_version, events).await?;
        tx.commit().await?;
        Ok(version)
    }

    /// Same as `save`, inside a caller-owned transaction
    pub async fn save_in(
        &self,
        conn: &mut PgConnection,
        aggregate: &mut A,
        expected_version: i64,
        events: Vec<EventEnvelope<A::Event>>,
    ) -> Result<i64, StoreError> {
        if events.is_empty() {
            return Ok(expected_version);
        }

        let aggregate_id = aggregate.aggregate_id();
        let new_version = expected_version + events.len() as i64;
        aggregate.set_version(new_version);
        let body = serde_json::to_value(&*aggregate)?;

        let written = if expected_version == 0 {
            sqlx::query(
                "INSERT INTO documents (collection, id, version, body)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (collection, id) DO NOTHING",
            )
            .bind(A::COLLECTION)
            .bind(aggregate_id)
            .bind(new_version)
            .bind(&body)
            .execute(&mut *conn)
            .await?
        } else {
            sqlx::query(
                "UPDATE documents SET version = $3, body = $4, updated_at = NOW()
                 WHERE collection = $1 AND id = $2 AND version = $5",
            )
            .bind(A::COLLECTION)
            .bind(aggregate_id)
            .bind(new_version)
            .bind(&body)
            .bind(expected_version)
            .execute(&mut *conn)
            .await?
        };

        if written.rows_affected() == 0 {
            aggregate.set_version(expected_version);
            return Err(StoreError::Conflict {
                collection: A::COLLECTION,
                id: aggregate_id,
                expected: expected_version,
            });
        }

        let event_count = events.len();
        for envelope in events {
            append_outbox(&mut *conn, A::AGGREGATE_TYPE, &envelope).await?;
        }

        tracing::info!(
            aggregate_id = %aggregate_id,
            aggregate_type = A::AGGREGATE_TYPE,
            new_version = new_version,
            event_count = event_count,
            "Saved document and outbox events"
        );

        Ok(new_version)
    }

    /// Remove a document. Returns false when it did not exist.
    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(A::COLLECTION)
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            id = %id,
            collection = A::COLLECTION,
            deleted = result.rows_affected(),
            "Deleted document"
        );

        Ok(result.rows_affected() > 0)
    }
}

async fn append_outbox<E: DomainEvent>(
    conn: &mut PgConnection,
    aggregate_type: &str,
    envelope: &EventEnvelope<E>,
) -> Result<(), StoreError> {
    let payload = serde_json::to_value(&envelope.event_data)?;

    sqlx::query(
        "INSERT INTO outbox_messages (
            id, aggregate_id, aggregate_type, event_id, event_type, sequence_number,
            payload, correlation_id, user_id, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(Uuid::now_v7())
    .bind(envelope.aggregate_id)
    .bind(aggregate_type)
    .bind(envelope.event_id)
    .bind(&envelope.event_type)
    .bind(envelope.sequence_number)
    .bind(payload)
    .bind(envelope.correlation_id)
    .bind(envelope.user_id)
    .bind(envelope.timestamp)
    .execute(conn)
    .await?;

    Ok(())
}

/// Decode a stored body, trusting the version column over the body field
pub fn decode_row<A: Document>(version: i64, body: serde_json::Value) -> Result<A, StoreError> {
    let mut aggregate: A = serde_json::from_value(body)?;
    aggregate.set_version(version);
    Ok(aggregate)
}
