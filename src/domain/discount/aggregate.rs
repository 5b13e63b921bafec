use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::core::Aggregate;
use crate::persistence::store::Document;
use super::commands::DiscountCommand;
use super::errors::DiscountError;
use super::events::*;

// ============================================================================
// Discount Code Aggregate - flat-value codes, single use per customer
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountAggregate {
    pub id: Uuid,
    #[serde(default)]
    pub version: i64,
    pub code: String,
    pub value: Decimal,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub used_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Codes are matched case-insensitively by storing them upper-cased
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl DiscountAggregate {
    /// Whether `user_id` may apply this code at `now`; returns its value
    pub fn check_redeemable(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Decimal, DiscountError> {
        if !self.is_active {
            return Err(DiscountError::Inactive);
        }
        if self.expires_at.is_some_and(|expiry| expiry <= now) {
            return Err(DiscountError::Expired);
        }
        if self.used_by.contains(&user_id) {
            return Err(DiscountError::AlreadyUsed);
        }
        Ok(self.value)
    }
}

impl Aggregate for DiscountAggregate {
    type Event = DiscountEvent;
    type Command = DiscountCommand;
    type Error = DiscountError;

    fn handle_create(command: &Self::Command) -> Result<Self::Event, Self::Error> {
        match command {
            DiscountCommand::Create { discount_id, code, value, expires_at } => {
                let code = normalize_code(code);
                if code.is_empty() {
                    return Err(DiscountError::EmptyCode);
                }
                if *value <= Decimal::ZERO {
                    return Err(DiscountError::InvalidValue);
                }

                Ok(DiscountEvent::Created(DiscountCreated {
                    discount_id: *discount_id,
                    code,
                    value: *value,
                    expires_at: *expires_at,
                    created_at: Utc::now(),
                }))
            }
            _ => Err(DiscountError::NotInitialized),
        }
    }

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            DiscountEvent::Created(e) => Ok(Self {
                id: e.discount_id,
                version: 0,
                code: e.code.clone(),
                value: e.value,
                is_active: true,
                expires_at: e.expires_at,
                used_by: Vec::new(),
                created_at: e.created_at,
            }),
            _ => Err(DiscountError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            DiscountEvent::Created(_) => {}
            DiscountEvent::Updated(e) => {
                self.value = e.value;
                self.is_active = e.is_active;
                self.expires_at = e.expires_at;
            }
            DiscountEvent::Redeemed(e) => {
                self.used_by.push(e.user_id);
            }
        }
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            DiscountCommand::Create { .. } => Err(DiscountError::NotInitialized),

            DiscountCommand::Update { value, is_active, expires_at } => {
                let value = value.unwrap_or(self.value);
                if value <= Decimal::ZERO {
                    return Err(DiscountError::InvalidValue);
                }
                Ok(vec![DiscountEvent::Updated(DiscountUpdated {
                    value,
                    is_active: is_active.unwrap_or(self.is_active),
                    expires_at: expires_at.unwrap_or(self.expires_at),
                })])
            }

            DiscountCommand::Redeem { user_id, order_id, at } => {
                self.check_redeemable(*user_id, *at)?;
                Ok(vec![DiscountEvent::Redeemed(DiscountRedeemed {
                    user_id: *user_id,
                    order_id: *order_id,
                    redeemed_at: *at,
                })])
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

impl Document for DiscountAggregate {
    const COLLECTION: &'static str = "discount_codes";
    const AGGREGATE_TYPE: &'static str = "DiscountCode";
}
