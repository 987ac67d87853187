use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum MessagesError {
    #[error("Internal error")]
    Internal,
}

impl From<crate::domain::error::DomainError> for MessagesError {
    fn from(e: crate::domain::error::DomainError) -> Self {
        tracing::warn!(error = %e, "messages call failed");
        Self::Internal
    }
}
