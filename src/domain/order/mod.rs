// ============================================================================
// Order Domain - checkout, payment and per-brand fulfilment
// ============================================================================
//
// - Value objects (OrderItem, BrandDelivery, ShippingAddress, ...)
// - Pricing (PriceBreakdown)
// - Events, Commands, Errors
// - Aggregate (OrderAggregate)
// - Command Handler (OrderCommandHandler) for placement and payment, which
//   also touch products, discount codes and invoices
//
// ============================================================================

pub mod value_objects;
pub mod pricing;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use aggregate::*;
pub use command_handler::*;
