use crate::error::AppError;

// ============================================================================
// Product Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product name cannot be empty")]
    EmptyName,

    #[error("Price must be greater than zero")]
    InvalidPrice,

    #[error("Stock cannot be negative")]
    NegativeStock,

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Product already reviewed")]
    AlreadyReviewed,

    #[error("Only {available} of {name} left in stock")]
    InsufficientStock { name: String, available: i32 },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Aggregate not initialized")]
    NotInitialized,
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::AlreadyReviewed | ProductError::InsufficientStock { .. } => {
                AppError::Conflict(err.to_string())
            }
            ProductError::NotInitialized => AppError::Internal(anyhow::anyhow!(err)),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}
