use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::Email;
use crate::persistence::core::DomainEvent;
use super::value_objects::BrandProfile;

// ============================================================================
// User Events
// ============================================================================
//
// Password hashes are applied to the document but never written to the
// outbox payload.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    Registered(UserRegistered),
    ProfileUpdated(UserProfileUpdated),
    PasswordChanged(UserPasswordChanged),
    RolesUpdated(UserRolesUpdated),
    CommissionSet(BrandCommissionSet),
    BrandApproved(BrandApproved),
    BrandRevoked(BrandRevoked),
}

impl DomainEvent for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::Registered(_) => "UserRegistered",
            UserEvent::ProfileUpdated(_) => "UserProfileUpdated",
            UserEvent::PasswordChanged(_) => "UserPasswordChanged",
            UserEvent::RolesUpdated(_) => "UserRolesUpdated",
            UserEvent::CommissionSet(_) => "BrandCommissionSet",
            UserEvent::BrandApproved(_) => "BrandApproved",
            UserEvent::BrandRevoked(_) => "BrandRevoked",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserRegistered {
    pub user_id: Uuid,
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_admin: bool,
    pub is_brand: bool,
    pub brand: Option<BrandProfile>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserProfileUpdated {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub brand: Option<BrandProfile>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserPasswordChanged {
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserRolesUpdated {
    pub is_admin: bool,
    pub is_brand: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BrandCommissionSet {
    pub commission_rate: Option<Decimal>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BrandApproved {
    pub email: Email,
    pub contact_name: String,
    pub brand_name: String,
    pub approved_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BrandRevoked {
    pub revoked_at: DateTime<Utc>,
}
