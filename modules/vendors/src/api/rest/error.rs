use axum::http::StatusCode;
use modkit::{from_parts, ProblemResponse};

use crate::domain::error::DomainError;

pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::VendorNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "VENDORS_NOT_FOUND",
            "Vendor not found",
            format!("Vendor with id {id} was not found"),
            instance,
        ),
        DomainError::ProfileMissing { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "VENDORS_PROFILE_NOT_FOUND",
            "Vendor profile not found",
            "Create a vendor profile first",
            instance,
        ),
        DomainError::InvalidRating { .. } | DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "VENDORS_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "vendors database error");
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
