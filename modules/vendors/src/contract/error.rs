use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone)]
pub enum VendorsError {
    #[error("Vendor not found: {id}")]
    NotFound { id: Uuid },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl From<crate::domain::error::DomainError> for VendorsError {
    fn from(e: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError;
        match e {
            DomainError::VendorNotFound { id } => Self::NotFound { id },
            DomainError::Validation { .. } | DomainError::InvalidRating { .. } => {
                Self::Validation {
                    message: e.to_string(),
                }
            }
            other => {
                tracing::warn!(error = %other, "vendors call failed");
                Self::Internal
            }
        }
    }
}
