use axum::{Extension, Router};
use modkit::api::response::Ack;
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};
use std::sync::Arc;

use crate::api::rest::dto::{
    ForgotPasswordReq, LoginReq, OtpChallengeDto, PublicUserDto, RegisterReq, ResetPasswordReq,
    SessionDto, UpdateBudgetReq, UpdateProfileReq, UserDto, VerifyOtpReq,
};
use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    router = OperationBuilder::<Missing, Missing, ()>::post("/api/auth/register")
        .operation_id("accounts.register")
        .summary("Register an account")
        .description("Creates an unverified account and mails a verification code")
        .tag("auth")
        .json_request::<RegisterReq>(openapi, "Name, email, password and optional role")
        .handler(handlers::register)
        .json_response_with_schema::<OtpChallengeDto>(openapi, 201, "Verification code sent")
        .problem_response(openapi, 403, "Role cannot be self-assigned")
        .problem_response(openapi, 409, "Email already registered")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/auth/login")
        .operation_id("accounts.login")
        .summary("Start login")
        .description("Checks the password and mails a 6-digit code valid for 10 minutes")
        .tag("auth")
        .json_request::<LoginReq>(openapi, "Email and password")
        .handler(handlers::login)
        .json_response_with_schema::<OtpChallengeDto>(openapi, 200, "Code sent")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/auth/verify-otp")
        .operation_id("accounts.verify_otp")
        .summary("Finish login")
        .tag("auth")
        .json_request::<VerifyOtpReq>(openapi, "User id and code")
        .handler(handlers::verify_otp)
        .json_response_with_schema::<SessionDto>(openapi, 200, "Bearer token and user")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/auth/forgot-password")
        .operation_id("accounts.forgot_password")
        .summary("Mail a password reset code")
        .tag("auth")
        .json_request::<ForgotPasswordReq>(openapi, "Email")
        .handler(handlers::forgot_password)
        .json_response_with_schema::<Ack>(openapi, 200, "Code sent")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/auth/reset-password")
        .operation_id("accounts.reset_password")
        .summary("Reset password with a code")
        .tag("auth")
        .json_request::<ResetPasswordReq>(openapi, "Email, code and new password")
        .handler(handlers::reset_password)
        .json_response_with_schema::<Ack>(openapi, 200, "Password changed")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/auth/me")
        .operation_id("accounts.me")
        .summary("Current user")
        .tag("auth")
        .bearer_auth()
        .handler(handlers::me)
        .json_response_with_schema::<UserDto>(openapi, 200, "Current user")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::put("/api/auth/profile")
        .operation_id("accounts.update_profile")
        .summary("Update name or phone")
        .tag("auth")
        .bearer_auth()
        .json_request::<UpdateProfileReq>(openapi, "Profile fields to change")
        .handler(handlers::update_profile)
        .json_response_with_schema::<UserDto>(openapi, 200, "Updated user")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::put("/api/auth/budget")
        .operation_id("accounts.update_budget")
        .summary("Set the personal budget")
        .description("Limit used by the booking budget check")
        .tag("auth")
        .bearer_auth()
        .json_request::<UpdateBudgetReq>(openapi, "Total budget")
        .handler(handlers::update_budget)
        .json_response_with_schema::<UserDto>(openapi, 200, "Updated user")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/auth/{id}")
        .operation_id("accounts.get_user")
        .summary("Public user fields")
        .tag("auth")
        .path_param("id", "User UUID")
        .handler(handlers::get_public_user)
        .json_response_with_schema::<PublicUserDto>(openapi, 200, "User")
        .standard_errors(openapi)
        .register(router, openapi);

    router = router.layer(Extension(service));
    Ok(router)
}
