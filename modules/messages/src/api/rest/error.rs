use axum::http::StatusCode;
use modkit::{from_parts, ProblemResponse};

use crate::domain::error::DomainError;

pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::MessageNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "MESSAGES_NOT_FOUND",
            "Message not found",
            e.to_string(),
            instance,
        ),
        DomainError::RecipientNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "MESSAGES_RECIPIENT_NOT_FOUND",
            "Recipient not found",
            e.to_string(),
            instance,
        ),
        DomainError::NotSender { .. } => from_parts(
            StatusCode::FORBIDDEN,
            "MESSAGES_FORBIDDEN",
            "Forbidden",
            e.to_string(),
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "MESSAGES_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "messages database error");
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
