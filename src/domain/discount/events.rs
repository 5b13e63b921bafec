use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::core::DomainEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DiscountEvent {
    Created(DiscountCreated),
    Updated(DiscountUpdated),
    Redeemed(DiscountRedeemed),
}

impl DomainEvent for DiscountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DiscountEvent::Created(_) => "DiscountCreated",
            DiscountEvent::Updated(_) => "DiscountUpdated",
            DiscountEvent::Redeemed(_) => "DiscountRedeemed",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiscountCreated {
    pub discount_id: Uuid,
    pub code: String,
    pub value: Decimal,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Carries the full resulting settings
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiscountUpdated {
    pub value: Decimal,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiscountRedeemed {
    pub user_id: Uuid,
    pub order_id: Uuid,
    pub redeemed_at: DateTime<Utc>,
}
