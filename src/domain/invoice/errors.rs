use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    #[error("Invoice has no lines")]
    EmptyLines,

    #[error("Commission rate must be between 0 and 1")]
    InvalidCommissionRate,

    #[error("Invoice is already settled")]
    AlreadySettled,

    #[error("Aggregate not initialized")]
    NotInitialized,
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::AlreadySettled => AppError::Conflict(err.to_string()),
            InvoiceError::NotInitialized => AppError::Internal(anyhow::anyhow!(err)),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}
