use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone)]
pub enum EventsError {
    #[error("Event not found: {id}")]
    NotFound { id: Uuid },

    #[error("Internal error")]
    Internal,
}

impl From<crate::domain::error::DomainError> for EventsError {
    fn from(e: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError;
        match e {
            DomainError::EventNotFound { id } => Self::NotFound { id },
            other => {
                tracing::warn!(error = %other, "events call failed");
                Self::Internal
            }
        }
    }
}
