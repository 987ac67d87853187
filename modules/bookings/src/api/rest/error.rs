use axum::http::StatusCode;
use modkit::{from_parts, ProblemResponse};

use crate::domain::error::DomainError;

pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::BookingNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "BOOKINGS_NOT_FOUND",
            "Booking not found",
            e.to_string(),
            instance,
        ),
        DomainError::PaymentNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "BOOKINGS_PAYMENT_NOT_FOUND",
            "Payment not found",
            e.to_string(),
            instance,
        ),
        DomainError::VendorNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "BOOKINGS_VENDOR_NOT_FOUND",
            "Vendor not found",
            e.to_string(),
            instance,
        ),
        DomainError::EventNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "BOOKINGS_EVENT_NOT_FOUND",
            "Event not found",
            e.to_string(),
            instance,
        ),
        DomainError::DateUnavailable { .. } => from_parts(
            StatusCode::CONFLICT,
            "BOOKINGS_DATE_UNAVAILABLE",
            "Date unavailable",
            e.to_string(),
            instance,
        ),
        DomainError::AlreadyCancelled { .. } => from_parts(
            StatusCode::CONFLICT,
            "BOOKINGS_ALREADY_CANCELLED",
            "Booking cancelled",
            e.to_string(),
            instance,
        ),
        DomainError::Forbidden { message } => from_parts(
            StatusCode::FORBIDDEN,
            "BOOKINGS_FORBIDDEN",
            "Forbidden",
            message.clone(),
            instance,
        ),
        DomainError::InvalidSignature => from_parts(
            StatusCode::BAD_REQUEST,
            "BOOKINGS_INVALID_SIGNATURE",
            "Invalid signature",
            e.to_string(),
            instance,
        ),
        DomainError::UnknownOrder { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "BOOKINGS_UNKNOWN_ORDER",
            "Unknown order",
            e.to_string(),
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "BOOKINGS_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::Gateway { .. } => {
            tracing::error!(error = ?e, "payment gateway error");
            from_parts(
                StatusCode::BAD_GATEWAY,
                "BOOKINGS_GATEWAY",
                "Payment gateway error",
                "The payment provider could not process the request",
                instance,
            )
        }
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "bookings database error");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
