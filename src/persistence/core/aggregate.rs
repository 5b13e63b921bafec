use uuid::Uuid;

use super::event::DomainEvent;

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// Key Principles:
// 1. Commands are validated before emitting events
// 2. Events represent facts that have already happened
// 3. All state changes flow through apply_event
// 4. The current state is persisted as a versioned document, the events
//    are appended to the outbox alongside it
//
// ============================================================================

/// Generic Aggregate trait - every document-backed aggregate implements this
///
/// Type Parameters:
/// - `Event`: The domain event type for this aggregate
/// - `Command`: The command type for this aggregate
/// - `Error`: The error type for business rule violations
pub trait Aggregate: Sized + Send + Sync {
    type Event: DomainEvent;
    type Command;
    type Error;

    /// Validate a creation command; there is no prior state
    fn handle_create(command: &Self::Command) -> Result<Self::Event, Self::Error>;

    /// Create new aggregate from its first event
    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error>;

    /// Apply subsequent events to update state
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Handle command and emit events (business logic)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    fn aggregate_id(&self) -> Uuid;

    /// Current version (number of events applied since creation)
    fn version(&self) -> i64;

    fn set_version(&mut self, version: i64);

    /// Run a creation command and return the new aggregate with its event
    fn create(command: &Self::Command) -> Result<(Self, Self::Event), Self::Error> {
        let event = Self::handle_create(command)?;
        let aggregate = Self::apply_first_event(&event)?;
        Ok((aggregate, event))
    }

    /// Run a command against the current state, applying whatever it emits
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle_command(command)?;
        for event in &events {
            self.apply_event(event)?;
        }
        Ok(events)
    }
}
