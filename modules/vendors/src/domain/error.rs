use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Vendor not found: {id}")]
    VendorNotFound { id: Uuid },

    #[error("No vendor profile for user {user_id}")]
    ProfileMissing { user_id: Uuid },

    #[error("Rating must be between 1 and 5, got {rating}")]
    InvalidRating { rating: i64 },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn vendor_not_found(id: Uuid) -> Self {
        Self::VendorNotFound { id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
