use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use modkit::api::response::Ack;
use modkit::{bad_request, AuthUser, ProblemResponse};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    AddGuestReq, BudgetDto, CreateEventReq, DaysQuery, EventDto, ExpensePatchReq, ExpenseReq,
    GuestDto, InvitationDto, InviteReq, PendingRsvpDto, RemindedDto, RsvpReq, RsvpUpdatedDto,
    SetBudgetReq, UpdateEventReq,
};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

const BAD_TIME: &str = "time must be HH:MM or HH:MM:SS";

// --- events ---

pub async fn create_event(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<CreateEventReq>,
) -> Result<(StatusCode, Json<EventDto>), ProblemResponse> {
    let new = req
        .into_new_event()
        .ok_or_else(|| bad_request(BAD_TIME))?;
    match svc.create_event(user, new).await {
        Ok(event) => Ok((StatusCode::CREATED, Json(event.into()))),
        Err(e) => {
            error!("Failed to create event: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_events(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<EventDto>>, ProblemResponse> {
    svc.list_events(user)
        .await
        .map(|events| Json(events.into_iter().map(Into::into).collect()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn get_event(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDto>, ProblemResponse> {
    svc.get_event(user, id)
        .await
        .map(|e| Json(e.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn update_event(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventReq>,
) -> Result<Json<EventDto>, ProblemResponse> {
    let patch = req.into_patch().ok_or_else(|| bad_request(BAD_TIME))?;
    match svc.update_event(user, id, patch).await {
        Ok(event) => Ok(Json(event.into())),
        Err(e) => {
            error!("Failed to update event {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_event(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ack>, ProblemResponse> {
    info!(event_id = %id, user_id = %user.id, "deleting event");
    match svc.delete_event(user, id).await {
        Ok(()) => Ok(Json(Ack::ok("Event deleted"))),
        Err(e) => {
            error!("Failed to delete event {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// --- guests ---

pub async fn add_guest(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<AddGuestReq>,
) -> Result<(StatusCode, Json<GuestDto>), ProblemResponse> {
    match svc.add_guest(user, req.event_id, &req.name, &req.email).await {
        Ok(guest) => Ok((StatusCode::CREATED, Json(guest.into()))),
        Err(e) => {
            info!("Guest not added: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_guests(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<GuestDto>>, ProblemResponse> {
    svc.list_guests(user, event_id)
        .await
        .map(|guests| Json(guests.into_iter().map(Into::into).collect()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn invite_guest(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<InviteReq>,
) -> Result<(StatusCode, Json<GuestDto>), ProblemResponse> {
    match svc
        .invite_guest(user, event_id, &req.name, &req.email, req.message)
        .await
    {
        Ok(guest) => Ok((StatusCode::CREATED, Json(guest.into()))),
        Err(e) => {
            error!("Failed to invite guest: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn update_rsvp(
    uri: Uri,
    _user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(guest_id): Path<Uuid>,
    Json(req): Json<RsvpReq>,
) -> Result<Json<RsvpUpdatedDto>, ProblemResponse> {
    match svc.update_rsvp(guest_id, req.status).await {
        Ok(guest) => Ok(Json(RsvpUpdatedDto {
            message: "RSVP updated successfully".to_string(),
            guest: guest.into(),
        })),
        Err(e) => {
            error!("Failed to update RSVP for {}: {}", guest_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_guest(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(guest_id): Path<Uuid>,
) -> Result<Json<Ack>, ProblemResponse> {
    match svc.delete_guest(user, guest_id).await {
        Ok(()) => Ok(Json(Ack::ok("Guest removed"))),
        Err(e) => {
            error!("Failed to delete guest {}: {}", guest_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn invitations_by_email(
    uri: Uri,
    _user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(email): Path<String>,
) -> Result<Json<Vec<InvitationDto>>, ProblemResponse> {
    svc.invitations_for(&email)
        .await
        .map(|found| Json(found.into_iter().map(Into::into).collect()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn pending_rsvp(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(event_id): Path<Uuid>,
    Query(q): Query<DaysQuery>,
) -> Result<Json<PendingRsvpDto>, ProblemResponse> {
    svc.pending_rsvp(user, event_id, q.days)
        .await
        .map(|p| Json(p.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn remind_pending(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(event_id): Path<Uuid>,
    Query(q): Query<DaysQuery>,
) -> Result<Json<RemindedDto>, ProblemResponse> {
    match svc.remind_pending(user, event_id, q.days).await {
        Ok(sent) => Ok(Json(RemindedDto { sent })),
        Err(e) => {
            error!("Failed to send reminders for {}: {}", event_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// --- budget ---

pub async fn get_budget(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<BudgetDto>, ProblemResponse> {
    svc.get_budget(user, event_id)
        .await
        .map(|b| Json(b.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn set_budget(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<SetBudgetReq>,
) -> Result<Json<BudgetDto>, ProblemResponse> {
    info!(event_id = %event_id, total_budget = req.total_budget, "setting event budget");
    match svc.set_total_budget(user, event_id, req.total_budget).await {
        Ok(b) => Ok(Json(b.into())),
        Err(e) => {
            error!("Failed to set budget: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn add_expense(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<ExpenseReq>,
) -> Result<(StatusCode, Json<BudgetDto>), ProblemResponse> {
    match svc.add_expense(user, event_id, req.into()).await {
        Ok(b) => Ok((StatusCode::CREATED, Json(b.into()))),
        Err(e) => {
            error!("Failed to add expense: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn update_expense(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path((event_id, expense_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ExpensePatchReq>,
) -> Result<Json<BudgetDto>, ProblemResponse> {
    match svc
        .update_expense(user, event_id, expense_id, req.into())
        .await
    {
        Ok(b) => Ok(Json(b.into())),
        Err(e) => {
            error!("Failed to update expense {}: {}", expense_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_expense(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path((event_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BudgetDto>, ProblemResponse> {
    match svc.delete_expense(user, event_id, expense_id).await {
        Ok(b) => Ok(Json(b.into())),
        Err(e) => {
            error!("Failed to delete expense {}: {}", expense_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
