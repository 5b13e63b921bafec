use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::core::DomainEvent;
use super::value_objects::{ProductDetails, Review};

// ============================================================================
// Product Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    Created(ProductCreated),
    Updated(ProductUpdated),
    ReviewAdded(ReviewAdded),
    StockDecremented(StockDecremented),
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::Created(_) => "ProductCreated",
            ProductEvent::Updated(_) => "ProductUpdated",
            ProductEvent::ReviewAdded(_) => "ReviewAdded",
            ProductEvent::StockDecremented(_) => "StockDecremented",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProductCreated {
    pub product_id: Uuid,
    pub brand_id: Uuid,
    pub brand_name: String,
    pub details: ProductDetails,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProductUpdated {
    pub details: ProductDetails,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ReviewAdded {
    pub review: Review,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StockDecremented {
    pub qty: i32,
    /// Stock left afterwards, never below zero
    pub remaining: i32,
}
