use crate::dates::{ParseError, ValidationError};
use service_core::error::AppError;
use thiserror::Error;

/// Failure of the storage collaborator. Never used for "record absent".
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("record {0} already exists")]
    Duplicate(String),

    #[error("stored document is malformed: {0}")]
    Malformed(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

// Every failure on the date endpoints is reported as 400 with its message.
impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match &err {
            RecordError::Validation(_) => {
                tracing::debug!(error = %err, "Rejected date input");
            }
            RecordError::Parse(_) | RecordError::Storage(_) => {
                tracing::error!(error = %err, "Date request failed");
            }
        }
        AppError::BadRequest(anyhow::Error::new(err))
    }
}
