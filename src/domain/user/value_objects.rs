use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// User Value Objects
// ============================================================================

/// Storefront details of a vendor account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BrandProfile {
    pub name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub description: String,
    /// Overrides the marketplace default commission when set
    #[serde(default)]
    pub commission_rate: Option<Decimal>,
}

/// Minimum accepted password length, checked before hashing
pub const MIN_PASSWORD_LEN: usize = 6;
