use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules.
#[derive(Error, Debug, Clone)]
pub enum AccountsError {
    #[error("User not found: {id}")]
    NotFound { id: Uuid },

    #[error("Internal error")]
    Internal,
}

impl From<crate::domain::error::DomainError> for AccountsError {
    fn from(e: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError;
        match e {
            DomainError::UserNotFound { id } => Self::NotFound { id },
            other => {
                tracing::warn!(error = %other, "accounts call failed");
                Self::Internal
            }
        }
    }
}
