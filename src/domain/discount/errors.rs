use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum DiscountError {
    #[error("Discount code cannot be empty")]
    EmptyCode,

    #[error("Discount value must be greater than zero")]
    InvalidValue,

    #[error("Discount code is not active")]
    Inactive,

    #[error("Discount code has expired")]
    Expired,

    #[error("Discount code already used")]
    AlreadyUsed,

    #[error("Aggregate not initialized")]
    NotInitialized,
}

impl From<DiscountError> for AppError {
    fn from(err: DiscountError) -> Self {
        match err {
            DiscountError::AlreadyUsed => AppError::Conflict(err.to_string()),
            DiscountError::NotInitialized => AppError::Internal(anyhow::anyhow!(err)),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}
