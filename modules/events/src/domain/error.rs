use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Event not found: {id}")]
    EventNotFound { id: Uuid },

    #[error("Guest not found: {id}")]
    GuestNotFound { id: Uuid },

    #[error("No budget for event {event_id}")]
    BudgetNotFound { event_id: Uuid },

    #[error("Expense not found: {id}")]
    ExpenseNotFound { id: Uuid },

    #[error("Guest {email} is already on the list")]
    GuestExists { email: String },

    #[error("Not allowed to act on event {event_id}")]
    NotOwner { event_id: Uuid },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
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
