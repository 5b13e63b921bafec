use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::shared::Email;
use super::value_objects::BrandProfile;

// ============================================================================
// User Commands
// ============================================================================

#[derive(Debug, Clone)]
pub enum UserCommand {
    Register {
        user_id: Uuid,
        name: String,
        email: Email,
        password_hash: String,
        /// Present when signing up as a vendor
        brand: Option<BrandProfile>,
        is_admin: bool,
    },
    /// Self-service; the stored commission override is kept
    UpdateProfile {
        name: Option<String>,
        email: Option<Email>,
        password_hash: Option<String>,
        brand: Option<BrandProfile>,
    },
    AdminUpdate {
        name: Option<String>,
        email: Option<Email>,
        is_admin: Option<bool>,
        is_brand: Option<bool>,
        /// `Some(None)` clears the override
        commission_rate: Option<Option<Decimal>>,
    },
    ApproveBrand,
    RevokeBrand,
}
