use axum::http::StatusCode;
use modkit::{from_parts, ProblemResponse};

use crate::domain::error::DomainError;

pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::EventNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "EVENTS_NOT_FOUND",
            "Event not found",
            e.to_string(),
            instance,
        ),
        DomainError::GuestNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "EVENTS_GUEST_NOT_FOUND",
            "Guest not found",
            e.to_string(),
            instance,
        ),
        DomainError::BudgetNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "EVENTS_BUDGET_NOT_FOUND",
            "Budget not found",
            e.to_string(),
            instance,
        ),
        DomainError::ExpenseNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "EVENTS_EXPENSE_NOT_FOUND",
            "Expense not found",
            e.to_string(),
            instance,
        ),
        DomainError::GuestExists { .. } => from_parts(
            StatusCode::CONFLICT,
            "EVENTS_GUEST_CONFLICT",
            "Guest already invited",
            e.to_string(),
            instance,
        ),
        DomainError::NotOwner { .. } => from_parts(
            StatusCode::FORBIDDEN,
            "EVENTS_FORBIDDEN",
            "Forbidden",
            "Only the event owner or an admin may do this",
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "EVENTS_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "events database error");
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
