use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Booking not found: {id}")]
    BookingNotFound { id: Uuid },

    #[error("Payment not found: {id}")]
    PaymentNotFound { id: Uuid },

    #[error("Vendor not found: {id}")]
    VendorNotFound { id: Uuid },

    #[error("Event not found: {id}")]
    EventNotFound { id: Uuid },

    #[error("Vendor {vendor_id} is not available on {date}")]
    DateUnavailable { vendor_id: Uuid, date: NaiveDate },

    #[error("Booking {id} is already cancelled")]
    AlreadyCancelled { id: Uuid },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Invalid payment signature")]
    InvalidSignature,

    #[error("Order {order_id} does not belong to booking {booking_id}")]
    UnknownOrder { booking_id: Uuid, order_id: String },

    #[error("Payment gateway error: {message}")]
    Gateway { message: String },

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

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}
