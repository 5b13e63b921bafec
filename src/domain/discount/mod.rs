pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;

pub use commands::*;
pub use aggregate::*;
