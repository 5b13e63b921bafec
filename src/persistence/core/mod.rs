// ============================================================================
// Persistence Core - Generic Aggregate Abstractions
// ============================================================================
//
// No domain-specific code lives here; every aggregate in src/domain/
// implements these traits.
//
// ============================================================================

pub mod aggregate;
pub mod event;

pub use aggregate::Aggregate;
pub use event::{envelope_events, DomainEvent, EventEnvelope};
