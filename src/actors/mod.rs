// ============================================================================
// Actors Module
// ============================================================================
//
// Actors are reserved for background infrastructure. Domain logic runs
// through CommandHandlers.
//
// - core/         - health reporting shared by background components
// - outbox_relay  - delivers outbox messages as e-mail notifications
//
// ============================================================================

mod core;
mod outbox_relay;

pub use self::core::{ComponentHealth, HealthStatus};
pub use outbox_relay::{GetRelayHealth, OutboxRelay};
