// ============================================================================
// User Business Rule Errors
// ============================================================================

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Brand name cannot be empty")]
    EmptyBrandName,

    #[error("Commission rate must be between 0 and 1")]
    InvalidCommissionRate,

    #[error("User is not a brand")]
    NotABrand,

    #[error("Brand is already approved")]
    AlreadyApproved,

    #[error("Brand is not approved")]
    NotApproved,

    #[error("Can not delete admin user")]
    CannotDeleteAdmin,

    #[error("Aggregate not initialized")]
    NotInitialized,
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::AlreadyApproved | UserError::NotApproved => AppError::Conflict(err.to_string()),
            UserError::NotInitialized => AppError::Internal(anyhow::anyhow!(err)),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}
