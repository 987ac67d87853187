use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
    Extension,
};
use modkit::api::response::Ack;
use modkit::{AuthUser, ProblemResponse};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{ConversationDto, DeliveredDto, MessageDto, SendMessageReq, TypingReq};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::sse_adapter::SseLiveChannels;
use crate::domain::service::Service;

pub async fn send_message(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<SendMessageReq>,
) -> Result<(StatusCode, Json<MessageDto>), ProblemResponse> {
    match svc.send(user.id, req.recipient_id, &req.text).await {
        Ok(m) => Ok((StatusCode::CREATED, Json(m.into()))),
        Err(e) => {
            error!("Failed to send message: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn conversations(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<ConversationDto>>, ProblemResponse> {
    svc.conversations(user.id)
        .await
        .map(|cs| Json(cs.into_iter().map(Into::into).collect()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn thread(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(other_id): Path<Uuid>,
) -> Result<Json<Vec<MessageDto>>, ProblemResponse> {
    svc.thread(user.id, other_id)
        .await
        .map(|ms| Json(ms.into_iter().map(Into::into).collect()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn delete_message(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ack>, ProblemResponse> {
    match svc.delete(user.id, id).await {
        Ok(()) => Ok(Json(Ack::ok("Message deleted"))),
        Err(e) => {
            info!("Message {} not deleted: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn typing(
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<TypingReq>,
) -> Json<DeliveredDto> {
    Json(DeliveredDto {
        delivered: svc.typing(user.id, req.recipient_id, req.is_typing),
    })
}

/// Live channel of the caller. EventSource clients pass `?token=`.
pub async fn stream(
    user: AuthUser,
    Extension(live): Extension<Arc<SseLiveChannels>>,
) -> impl IntoResponse {
    info!(user_id = %user.id, "live stream opened");
    live.open(user.id)
}
