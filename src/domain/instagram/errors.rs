use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum InstagramError {
    #[error("Instagram media id cannot be empty")]
    MissingMediaId,

    #[error("Media {got} does not belong to post {expected}")]
    MediaMismatch { expected: String, got: String },

    #[error("Display order cannot be negative")]
    NegativeDisplayOrder,

    #[error("Aggregate not initialized")]
    NotInitialized,
}

impl From<InstagramError> for AppError {
    fn from(err: InstagramError) -> Self {
        match err {
            InstagramError::NegativeDisplayOrder => AppError::BadRequest(err.to_string()),
            _ => AppError::Internal(anyhow::anyhow!(err)),
        }
    }
}
