use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use modkit::api::response::Ack;
use modkit::{AuthUser, ProblemResponse};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    ForgotPasswordReq, LoginReq, OtpChallengeDto, PublicUserDto, RegisterReq, ResetPasswordReq,
    SessionDto, UpdateBudgetReq, UpdateProfileReq, UserDto, VerifyOtpReq,
};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

pub async fn register(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<RegisterReq>,
) -> Result<(StatusCode, Json<OtpChallengeDto>), ProblemResponse> {
    info!(email = %req.email, "registering account");
    match svc.register(req.into()).await {
        Ok(challenge) => Ok((StatusCode::CREATED, Json(challenge.into()))),
        Err(e) => {
            error!("Failed to register: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn login(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<LoginReq>,
) -> Result<Json<OtpChallengeDto>, ProblemResponse> {
    match svc.login(&req.email, &req.password).await {
        Ok(challenge) => Ok(Json(challenge.into())),
        Err(e) => {
            info!("Login rejected: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn verify_otp(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<VerifyOtpReq>,
) -> Result<Json<SessionDto>, ProblemResponse> {
    match svc.verify_otp(req.user_id, &req.otp).await {
        Ok(session) => Ok(Json(session.into())),
        Err(e) => {
            info!(user_id = %req.user_id, "OTP rejected: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn forgot_password(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<ForgotPasswordReq>,
) -> Result<Json<Ack>, ProblemResponse> {
    match svc.forgot_password(&req.email).await {
        Ok(challenge) => Ok(Json(Ack::ok(challenge.message))),
        Err(e) => {
            error!("Failed to start password reset: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn reset_password(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<ResetPasswordReq>,
) -> Result<Json<Ack>, ProblemResponse> {
    match svc
        .reset_password(&req.email, &req.otp, req.new_password)
        .await
    {
        Ok(()) => Ok(Json(Ack::ok("Password reset successful"))),
        Err(e) => {
            error!("Failed to reset password: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn me(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<UserDto>, ProblemResponse> {
    svc.get_user(user.id)
        .await
        .map(|u| Json(u.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn get_public_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUserDto>, ProblemResponse> {
    match svc.get_user(id).await {
        Ok(u) => Ok(Json(u.into())),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn update_profile(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<UpdateProfileReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!(user_id = %user.id, "updating profile");
    match svc.update_profile(user.id, req.into()).await {
        Ok(u) => Ok(Json(u.into())),
        Err(e) => {
            error!("Failed to update profile: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn update_budget(
    uri: Uri,
    user: AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<UpdateBudgetReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!(user_id = %user.id, total_budget = req.total_budget, "updating personal budget");
    match svc.set_budget(user.id, req.total_budget).await {
        Ok(u) => Ok(Json(u.into())),
        Err(e) => {
            error!("Failed to update budget: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
