// ============================================================================
// Product Domain - the catalog
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;

pub use value_objects::*;
pub use commands::*;
pub use aggregate::*;
