// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with:
// - Value objects
// - Events
// - Commands
// - Errors
// - Aggregate implementation
//
// Orchestration that spans aggregates (placing and paying orders, syncing
// the Instagram feed) lives in a service next to the aggregate it drives.
//
// ============================================================================

pub mod shared;

pub mod user;
pub mod interest;
pub mod product;
pub mod discount;
pub mod order;
pub mod invoice;
pub mod instagram;
