use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::core::DomainEvent;
use super::value_objects::InvoiceLine;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InvoiceEvent {
    Issued(InvoiceIssued),
    Settled(InvoiceSettled),
}

impl DomainEvent for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::Issued(_) => "InvoiceIssued",
            InvoiceEvent::Settled(_) => "InvoiceSettled",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InvoiceIssued {
    pub invoice_id: Uuid,
    pub order_id: Uuid,
    pub brand_id: Uuid,
    pub brand_name: String,
    pub lines: Vec<InvoiceLine>,
    pub gross: Decimal,
    pub commission_rate: Decimal,
    pub commission: Decimal,
    pub payout: Decimal,
    pub issued_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InvoiceSettled {
    pub settled_at: DateTime<Utc>,
}
