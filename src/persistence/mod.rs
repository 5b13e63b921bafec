// ============================================================================
// Persistence Infrastructure
// ============================================================================
//
// Generic aggregate + document store plumbing.
// Domain-specific code is in src/domain/
//
// ============================================================================

pub mod core;
pub mod store;

pub use store::*;
