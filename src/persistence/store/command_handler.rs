use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::AppError;
use crate::persistence::core::{envelope_events, Aggregate, EventEnvelope};

use super::document_store::{Document, DocumentStore};

// ============================================================================
// Generic Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Document Store
//
// ============================================================================

/// Who issued a command and which request it belongs to
#[derive(Debug, Clone, Copy)]
pub struct CommandContext {
    pub correlation_id: Uuid,
    pub user_id: Option<Uuid>,
}

impl CommandContext {
    pub fn new(user_id: Option<Uuid>) -> Self {
        Self {
            correlation_id: Uuid::now_v7(),
            user_id,
        }
    }
}

pub struct CommandHandler<A: Document> {
    store: DocumentStore<A>,
}

impl<A: Document> Clone for CommandHandler<A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<A> CommandHandler<A>
where
    A: Document,
    AppError: From<A::Error>,
{
    pub fn new(store: DocumentStore<A>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DocumentStore<A> {
        &self.store
    }

    /// Load an aggregate or fail with 404
    pub async fn get(&self, id: Uuid) -> Result<A, AppError> {
        self.store
            .load(id)
            .await?
            .ok_or(AppError::NotFound(A::AGGREGATE_TYPE))
    }

    /// Handle a creation command and persist the new aggregate
    pub async fn create(&self, command: A::Command, ctx: CommandContext) -> Result<A, AppError> {
        let (mut aggregate, event) = A::create(&command)?;
        let envelopes = Self::wrap(&aggregate, 0, vec![event], ctx);
        self.store.save(&mut aggregate, 0, envelopes).await?;
        Ok(aggregate)
    }

    /// Handle a command against an existing aggregate and persist the result
    pub async fn execute(&self, id: Uuid, command: A::Command, ctx: CommandContext) -> Result<A, AppError> {
        let mut aggregate = self.get(id).await?;
        let expected_version = aggregate.version();
        let events = aggregate.execute(&command)?;
        let envelopes = Self::wrap(&aggregate, expected_version, events, ctx);
        self.store.save(&mut aggregate, expected_version, envelopes).await?;
        Ok(aggregate)
    }

    /// `create` inside a caller-owned transaction
    pub async fn create_in(
        &self,
        conn: &mut PgConnection,
        command: A::Command,
        ctx: CommandContext,
    ) -> Result<A, AppError> {
        let (mut aggregate, event) = A::create(&command)?;
        let envelopes = Self::wrap(&aggregate, 0, vec![event], ctx);
        self.store.save_in(conn, &mut aggregate, 0, envelopes).await?;
        Ok(aggregate)
    }

    /// `execute` against an already loaded aggregate inside a caller-owned transaction
    pub async fn execute_loaded_in(
        &self,
        conn: &mut PgConnection,
        mut aggregate: A,
        command: A::Command,
        ctx: CommandContext,
    ) -> Result<A, AppError> {
        let expected_version = aggregate.version();
        let events = aggregate.execute(&command)?;
        let envelopes = Self::wrap(&aggregate, expected_version, events, ctx);
        self.store.save_in(conn, &mut aggregate, expected_version, envelopes).await?;
        Ok(aggregate)
    }

    fn wrap(
        aggregate: &A,
        expected_version: i64,
        events: Vec<A::Event>,
        ctx: CommandContext,
    ) -> Vec<EventEnvelope<A::Event>> {
        envelope_events(
            aggregate.aggregate_id(),
            expected_version,
            events,
            ctx.correlation_id,
            ctx.user_id,
        )
    }
}
