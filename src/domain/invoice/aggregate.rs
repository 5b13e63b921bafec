use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::round2;
use crate::persistence::core::Aggregate;
use crate::persistence::store::Document;
use super::commands::InvoiceCommand;
use super::errors::InvoiceError;
use super::events::*;
use super::value_objects::*;

// ============================================================================
// Invoice Aggregate - what the marketplace owes a brand for one order
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceAggregate {
    pub id: Uuid,
    #[serde(default)]
    pub version: i64,
    pub order_id: Uuid,
    pub brand_id: Uuid,
    pub brand_name: String,
    pub lines: Vec<InvoiceLine>,
    pub gross: Decimal,
    pub commission_rate: Decimal,
    pub commission: Decimal,
    pub payout: Decimal,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Aggregate for InvoiceAggregate {
    type Event = InvoiceEvent;
    type Command = InvoiceCommand;
    type Error = InvoiceError;

    fn handle_create(command: &Self::Command) -> Result<Self::Event, Self::Error> {
        match command {
            InvoiceCommand::Issue { invoice_id, order_id, brand_id, brand_name, lines, commission_rate } => {
                if lines.is_empty() {
                    return Err(InvoiceError::EmptyLines);
                }
                if *commission_rate < Decimal::ZERO || *commission_rate > Decimal::ONE {
                    return Err(InvoiceError::InvalidCommissionRate);
                }

                let gross = round2(lines.iter().map(|l| l.amount).sum());
                let commission = round2(gross * commission_rate);

                Ok(InvoiceEvent::Issued(InvoiceIssued {
                    invoice_id: *invoice_id,
                    order_id: *order_id,
                    brand_id: *brand_id,
                    brand_name: brand_name.clone(),
                    lines: lines.clone(),
                    gross,
                    commission_rate: *commission_rate,
                    commission,
                    payout: gross - commission,
                    issued_at: Utc::now(),
                }))
            }
            InvoiceCommand::Settle => Err(InvoiceError::NotInitialized),
        }
    }

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            InvoiceEvent::Issued(e) => Ok(Self {
                id: e.invoice_id,
                version: 0,
                order_id: e.order_id,
                brand_id: e.brand_id,
                brand_name: e.brand_name.clone(),
                lines: e.lines.clone(),
                gross: e.gross,
                commission_rate: e.commission_rate,
                commission: e.commission,
                payout: e.payout,
                status: InvoiceStatus::Unsettled,
                created_at: e.issued_at,
                settled_at: None,
            }),
            InvoiceEvent::Settled(_) => Err(InvoiceError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        if let InvoiceEvent::Settled(e) = event {
            self.status = InvoiceStatus::Settled;
            self.settled_at = Some(e.settled_at);
        }
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::Issue { .. } => Err(InvoiceError::NotInitialized),
            InvoiceCommand::Settle => {
                if self.status == InvoiceStatus::Settled {
                    return Err(InvoiceError::AlreadySettled);
                }
                Ok(vec![InvoiceEvent::Settled(InvoiceSettled { settled_at: Utc::now() })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

impl Document for InvoiceAggregate {
    const COLLECTION: &'static str = "invoices";
    const AGGREGATE_TYPE: &'static str = "Invoice";
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(unit_price: Decimal, qty: i32) -> InvoiceLine {
        InvoiceLine {
            product_id: Uuid::new_v4(),
            name: "Silk Dress".to_string(),
            qty,
            unit_price,
            amount: unit_price * Decimal::from(qty),
        }
    }

    fn issue(lines: Vec<InvoiceLine>, commission_rate: Decimal) -> InvoiceCommand {
        InvoiceCommand::Issue {
            invoice_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            brand_name: "Silk House".to_string(),
            lines,
            commission_rate,
        }
    }

    #[test]
    fn test_commission_and_payout() {
        let (invoice, _) = InvoiceAggregate::create(&issue(vec![line(dec!(99.99), 1), line(dec!(10), 2)], dec!(0.20))).unwrap();

        assert_eq!(invoice.gross, dec!(119.99));
        // 119.99 * 0.2 = 23.998
        assert_eq!(invoice.commission, dec!(24.00));
        assert_eq!(invoice.payout, dec!(95.99));
        assert_eq!(invoice.status, InvoiceStatus::Unsettled);
    }

    #[test]
    fn test_brand_override_rate() {
        let (invoice, _) = InvoiceAggregate::create(&issue(vec![line(dec!(50), 1)], dec!(0.05))).unwrap();
        assert_eq!(invoice.commission, dec!(2.50));
        assert_eq!(invoice.payout, dec!(47.50));
    }

    #[test]
    fn test_rate_out_of_range() {
        let result = InvoiceAggregate::create(&issue(vec![line(dec!(50), 1)], dec!(1.01)));
        assert!(matches!(result, Err(InvoiceError::InvalidCommissionRate)));
    }

    #[test]
    fn test_settle_once() {
        let (mut invoice, _) = InvoiceAggregate::create(&issue(vec![line(dec!(50), 1)], dec!(0.2))).unwrap();

        invoice.execute(&InvoiceCommand::Settle).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Settled);
        assert!(invoice.settled_at.is_some());

        assert!(matches!(invoice.handle_command(&InvoiceCommand::Settle), Err(InvoiceError::AlreadySettled)));
    }
}
