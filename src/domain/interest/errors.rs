use crate::error::AppError;
use super::value_objects::InterestStatus;

#[derive(Debug, thiserror::Error)]
pub enum InterestError {
    #[error("Brand name cannot be empty")]
    EmptyBrandName,

    #[error("Contact name cannot be empty")]
    EmptyContactName,

    #[error("Application was already {}", .0.as_str())]
    AlreadyReviewed(InterestStatus),

    #[error("Aggregate not initialized")]
    NotInitialized,
}

impl From<InterestError> for AppError {
    fn from(err: InterestError) -> Self {
        match err {
            InterestError::AlreadyReviewed(_) => AppError::Conflict(err.to_string()),
            InterestError::NotInitialized => AppError::Internal(anyhow::anyhow!(err)),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}
