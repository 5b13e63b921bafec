use uuid::Uuid;

use crate::error::AppError;
use super::value_objects::DeliveryStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Cart is empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Shipping address is incomplete")]
    IncompleteAddress,

    #[error("Order is already paid")]
    AlreadyPaid,

    #[error("Order is not paid")]
    NotPaid,

    #[error("Order is already delivered")]
    AlreadyDelivered,

    #[error("Brand {0} has no items in this order")]
    UnknownBrand(Uuid),

    #[error("Brand delivery is {0:?}, expected Pending")]
    NotPending(DeliveryStatus),

    #[error("Paid orders cannot be deleted")]
    CannotDeletePaid,

    #[error("Aggregate not initialized")]
    NotInitialized,
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::AlreadyPaid
            | OrderError::AlreadyDelivered
            | OrderError::NotPending(_)
            | OrderError::CannotDeletePaid => AppError::Conflict(err.to_string()),
            OrderError::UnknownBrand(_) => AppError::NotFound("Brand delivery"),
            OrderError::NotInitialized => AppError::Internal(anyhow::anyhow!(err)),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}
