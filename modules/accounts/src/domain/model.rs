use chrono::{DateTime, Utc};
use modkit::Role;
use uuid::Uuid;

use crate::contract::model::User;

/// Stored account, including credentials. Stays inside this module.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub otp: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub is_verified: bool,
    pub total_budget: Option<f64>,
    pub budget_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            phone: self.phone.clone(),
            is_verified: self.is_verified,
            total_budget: self.total_budget,
            budget_updated_at: self.budget_updated_at,
            created_at: self.created_at,
        }
    }
}

/// Result of a step that mailed a one-time code.
#[derive(Debug, Clone, PartialEq)]
pub struct OtpChallenge {
    pub user_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}
