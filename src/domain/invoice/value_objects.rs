use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Unsettled,
    Settled,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InvoiceLine {
    pub product_id: Uuid,
    pub name: String,
    pub qty: i32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}
