use chrono::{DateTime, Utc};
use modkit::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{NewAccount, ProfilePatch, User};
use crate::domain::model::{OtpChallenge, Session};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub total_budget: Option<f64>,
    pub budget_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What anyone may learn about another account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicUserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterReq {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OtpChallengeDto {
    pub user_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyOtpReq {
    pub user_id: Uuid,
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ForgotPasswordReq {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetPasswordReq {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
pub struct UpdateProfileReq {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateBudgetReq {
    pub total_budget: f64,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            phone: u.phone,
            is_verified: u.is_verified,
            total_budget: u.total_budget,
            budget_updated_at: u.budget_updated_at,
            created_at: u.created_at,
        }
    }
}

impl From<User> for PublicUserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
        }
    }
}

impl From<RegisterReq> for NewAccount {
    fn from(r: RegisterReq) -> Self {
        Self {
            name: r.name,
            email: r.email,
            password: r.password,
            role: r.role,
        }
    }
}

impl From<UpdateProfileReq> for ProfilePatch {
    fn from(r: UpdateProfileReq) -> Self {
        Self {
            name: r.name,
            phone: r.phone,
        }
    }
}

impl From<OtpChallenge> for OtpChallengeDto {
    fn from(c: OtpChallenge) -> Self {
        Self {
            user_id: c.user_id,
            message: c.message,
        }
    }
}

impl From<Session> for SessionDto {
    fn from(s: Session) -> Self {
        Self {
            token: s.token,
            user: s.user.into(),
        }
    }
}
