use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum DiscountCommand {
    Create {
        discount_id: Uuid,
        code: String,
        value: Decimal,
        expires_at: Option<DateTime<Utc>>,
    },
    Update {
        value: Option<Decimal>,
        is_active: Option<bool>,
        /// `Some(None)` clears the expiry
        expires_at: Option<Option<DateTime<Utc>>>,
    },
    Redeem {
        user_id: Uuid,
        order_id: Uuid,
        at: DateTime<Utc>,
    },
}
