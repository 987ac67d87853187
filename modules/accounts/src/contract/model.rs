use chrono::{DateTime, Utc};
use modkit::Role;
use uuid::Uuid;

/// Public account data. Never carries credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
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

#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone: Option<String>,
}
