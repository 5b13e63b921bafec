use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::InvoiceLine;

#[derive(Debug, Clone)]
pub enum InvoiceCommand {
    Issue {
        invoice_id: Uuid,
        order_id: Uuid,
        brand_id: Uuid,
        brand_name: String,
        lines: Vec<InvoiceLine>,
        commission_rate: Decimal,
    },
    Settle,
}
