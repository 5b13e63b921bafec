use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::core::DomainEvent;
use super::pricing::PriceBreakdown;
use super::value_objects::*;

// ============================================================================
// Order Events - Domain Events for Order Aggregate
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Placed(OrderPlaced),
    Paid(OrderPaid),
    BrandDispatched(BrandDispatched),
    BrandDelivered(BrandDelivered),
    Delivered(OrderDelivered),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Placed(_) => "OrderPlaced",
            OrderEvent::Paid(_) => "OrderPaid",
            OrderEvent::BrandDispatched(_) => "BrandDispatched",
            OrderEvent::BrandDelivered(_) => "BrandDelivered",
            OrderEvent::Delivered(_) => "OrderDelivered",
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderPlaced {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub prices: PriceBreakdown,
    pub discount: Option<AppliedDiscount>,
    pub brand_deliveries: Vec<BrandDelivery>,
    pub placed_at: DateTime<Utc>,
}

/// Carries what the receipt and brand notices need to render
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderPaid {
    pub user_id: Uuid,
    pub payment_result: PaymentResult,
    pub total_price: Decimal,
    pub items: Vec<OrderItem>,
    pub brand_deliveries: Vec<BrandDelivery>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BrandDispatched {
    pub user_id: Uuid,
    pub brand_id: Uuid,
    pub brand_name: String,
    pub tracking_number: Option<String>,
    pub dispatched_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BrandDelivered {
    pub brand_id: Uuid,
    pub delivered_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderDelivered {
    pub delivered_at: DateTime<Utc>,
}
