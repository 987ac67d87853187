use axum::http::StatusCode;
use modkit::{from_parts, ProblemResponse};

use crate::domain::error::DomainError;

/// Map a domain error to an RFC 9457 response.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::UserNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "ACCOUNTS_NOT_FOUND",
            "User not found",
            format!("User with id {id} was not found"),
            instance,
        ),
        DomainError::EmailNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "ACCOUNTS_EMAIL_NOT_FOUND",
            "User not found",
            "No account is registered with this email",
            instance,
        ),
        DomainError::EmailAlreadyExists { email } => from_parts(
            StatusCode::CONFLICT,
            "ACCOUNTS_EMAIL_CONFLICT",
            "Email already exists",
            format!("Email '{email}' is already in use"),
            instance,
        ),
        DomainError::InvalidCredentials => from_parts(
            StatusCode::UNAUTHORIZED,
            "ACCOUNTS_INVALID_CREDENTIALS",
            "Invalid credentials",
            "Invalid email or password",
            instance,
        ),
        DomainError::InvalidOtp | DomainError::OtpExpired => from_parts(
            StatusCode::BAD_REQUEST,
            "ACCOUNTS_INVALID_OTP",
            "Invalid OTP",
            e.to_string(),
            instance,
        ),
        DomainError::RoleNotAllowed { .. } => from_parts(
            StatusCode::FORBIDDEN,
            "ACCOUNTS_ROLE_NOT_ALLOWED",
            "Role not allowed",
            e.to_string(),
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "ACCOUNTS_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::Credentials { .. } | DomainError::Database { .. } => {
            tracing::error!(error = ?e, "accounts internal error");
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
